use std::path::Path;

fn main() {
    let config_path = Path::new("config/preprocessing.json");
    validate_config_file(config_path);
    set_build_dependencies();
}

fn validate_config_file(config_path: &Path) {
    // Ensure rules exist at build time
    assert!(
        config_path.exists(),
        "\n\nPREPROCESSING CONFIG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the preprocessing rules before building.\n",
        config_path.display()
    );

    let contents = std::fs::read_to_string(config_path).unwrap_or_else(|e| {
        panic!(
            "\n\nPREPROCESSING CONFIG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            config_path.display()
        );
    });

    let config: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nPREPROCESSING CONFIG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            config_path.display()
        );
    });

    validate_config_structure(&config);
}

fn validate_config_structure(config: &serde_json::Value) {
    assert!(
        config.is_object(),
        "\n\nPREPROCESSING CONFIG BUILD ERROR: Root must be a JSON object\n\
         Got: {config}\n"
    );

    let trim_words = validate_trim_words(config);
    let regexes = validate_substitutions(config, "regex_substitutions");
    let words = validate_substitutions(config, "word_replacements");

    for flag in ["remove_registrant_words_from_fund", "combine_registrant_and_fund"] {
        if let Some(value) = config.get(flag) {
            assert!(
                value.is_boolean(),
                "\n\nPREPROCESSING CONFIG BUILD ERROR: '{flag}' must be true or false\n\
                 Got: {value}\n"
            );
        }
    }

    println!(
        "cargo:warning=Validated preprocessing rules: {trim_words} trim words, {regexes} regex substitutions, {words} word replacements"
    );
}

fn validate_trim_words(config: &serde_json::Value) -> usize {
    let Some(words) = config.get("trim_words") else {
        return 0;
    };
    let words = words.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nPREPROCESSING CONFIG BUILD ERROR: 'trim_words' must be an array\n\
             Got: {words}\n"
        );
    });

    for (i, word) in words.iter().enumerate() {
        let word = word.as_str().unwrap_or_else(|| {
            panic!(
                "\n\nPREPROCESSING CONFIG BUILD ERROR: trim word at index {i} must be a string\n"
            );
        });
        assert!(
            !word.trim().is_empty(),
            "\n\nPREPROCESSING CONFIG BUILD ERROR: trim word at index {i} is empty\n"
        );
    }

    words.len()
}

fn validate_substitutions(config: &serde_json::Value, field: &str) -> usize {
    let Some(entries) = config.get(field) else {
        return 0;
    };
    let entries = entries.as_array().unwrap_or_else(|| {
        panic!(
            "\n\nPREPROCESSING CONFIG BUILD ERROR: '{field}' must be an array\n\
             Got: {entries}\n"
        );
    });

    for (i, entry) in entries.iter().enumerate() {
        let pattern = entry.get("pattern").and_then(|v| v.as_str());
        assert!(
            pattern.is_some_and(|p| !p.is_empty()),
            "\n\nPREPROCESSING CONFIG BUILD ERROR: '{field}' entry {i} needs a non-empty 'pattern' string\n"
        );
        assert!(
            entry.get("replacement").is_some_and(serde_json::Value::is_string),
            "\n\nPREPROCESSING CONFIG BUILD ERROR: '{field}' entry {i} needs a 'replacement' string\n"
        );
    }

    entries.len()
}

fn set_build_dependencies() {
    // Tell cargo to rerun if the rules change
    println!("cargo:rerun-if-changed=config/preprocessing.json");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
