use std::fs;

const DEFAULT_CONFIG: &str = "src/default_config.toml";

fn main() {
    println!("cargo:rerun-if-changed={DEFAULT_CONFIG}");

    // Compiled in with include_str! by Config::compiled_default.
    let content = fs::read_to_string(DEFAULT_CONFIG)
        .unwrap_or_else(|e| panic!("mdchat: cannot read {DEFAULT_CONFIG}: {e}"));

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("mdchat: {DEFAULT_CONFIG} is not valid TOML: {e}"),
    };
    for section in ["extensions", "render"] {
        if !table.get(section).is_some_and(toml::Value::is_table) {
            panic!("mdchat: {DEFAULT_CONFIG} is missing the [{section}] table");
        }
    }
}
