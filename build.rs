// build.rs

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";

/// Picks the message language: a `lang_*` feature wins, then `ACTIONLINE_LANG`, then English.
fn select_language() -> String {
    let mut active_langs: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix("CARGO_FEATURE_LANG_").map(str::to_lowercase))
        .collect();
    active_langs.sort();

    match active_langs.first() {
        Some(first) => {
            if active_langs.len() > 1 {
                println!(
                    "cargo:warning=Multiple language features enabled ({:?}). Using '{}'.",
                    active_langs, first
                );
            }
            first.clone()
        }
        None => env::var("ACTIONLINE_LANG").unwrap_or_else(|_| FALLBACK_LANG.to_string()),
    }
}

fn load_messages(path: &str) -> Option<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).ok()?;
    let messages = toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e));
    Some(messages)
}

fn main() {
    let lang = select_language();
    println!("cargo:rustc-env=ACTIONLINE_LANG_EFFECTIVE={}", lang);

    println!("cargo:rerun-if-env-changed=ACTIONLINE_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    // English is always loaded so that every key has a value.
    let fallback_path = format!("locales/{}.toml", FALLBACK_LANG);
    let mut messages = load_messages(&fallback_path)
        .unwrap_or_else(|| panic!("Failed to read fallback language file: {}", fallback_path));

    if lang != FALLBACK_LANG {
        let lang_path = format!("locales/{}.toml", lang);
        match load_messages(&lang_path) {
            Some(specific) => messages.extend(specific),
            None => println!(
                "cargo:warning=Language file '{}' not found. Falling back to '{}'.",
                lang_path, FALLBACK_LANG
            ),
        }
    }

    // Every key becomes one arm of `t!`, expanding to a plain string literal so
    // that it can be used as a `format!` template.
    let mut macro_code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in &messages {
        let escaped_value = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n");
        macro_code.push_str(&format!("    (\"{}\") => {{ \"{}\" }};\n", key, escaped_value));
    }
    macro_code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    macro_code.push('}');

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is always set for build scripts");
    let dest_path = Path::new(&out_dir).join("translations.rs");
    fs::write(&dest_path, macro_code).expect("Failed to write generated translations");
}
