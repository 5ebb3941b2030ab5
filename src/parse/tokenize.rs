/// True for a `KEY=value` word whose key is a valid shell identifier.
fn is_assignment(word: &str) -> bool {
    let Some((key, _)) = word.split_once('=') else {
        return false;
    };
    key.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Extract the executable name of a command, skipping leading VAR=value
/// assignments and stripping any directory part.
pub fn base_command(command: &str) -> String {
    let word = tokenize(command)
        .into_iter()
        .find(|w| !is_assignment(w))
        .unwrap_or_default();
    // /usr/bin/ls → ls, ./script.sh → script.sh
    match word.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name.to_string(),
        _ => word,
    }
}

/// Tokenize a command segment into words using shlex (POSIX word splitting).
pub fn tokenize(command: &str) -> Vec<String> {
    shlex::split(command).unwrap_or_else(|| {
        // Fallback: simple whitespace splitting if shlex can't parse
        command.split_whitespace().map(String::from).collect()
    })
}
