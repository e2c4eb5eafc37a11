// src/engine/generator.rs

//! Source text of generated pages. Output is a pure function of the inputs,
//! which is what lets the writer skip rewrites of unchanged pages.

use serde_json::{json, Value};

/// Page rendering a single exported symbol of a catalog file.
pub fn symbol_page(symbol: &str, import_path: &str) -> String {
    format!(
        "import {{ {symbol} }} from {import};\n\
         \n\
         export default function Page() {{\n  return <{symbol} />;\n}}\n",
        import = js_string(import_path),
    )
}

/// Index page listing every generated page.
pub fn index_page(index_import: &str, links: &[String], catalog_path: &str) -> String {
    let links = json!(links).to_string();
    let env = json!({ "catalogPath": catalog_path }).to_string();
    format!(
        "import IndexPage from {import};\n\
         \n\
         export default function Page() {{\n  return <IndexPage links={{{links}}} env={{{env}}} />;\n}}\n",
        import = js_string(index_import),
    )
}

fn js_string(value: &str) -> String {
    Value::from(value).to_string()
}
