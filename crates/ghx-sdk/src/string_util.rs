/// String helpers for values read from the environment.
pub struct StringUtil;

impl StringUtil {
    /// Interpret an environment-style flag.
    ///
    /// `"1"`, `"true"`, `"yes"` are true and `"0"`, `"false"`, `"no"` are false
    /// (case-insensitive, surrounding whitespace ignored). Anything else,
    /// including the empty string, is `None`.
    pub fn convert_to_bool(value: &str) -> Option<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_to_bool_values() {
        assert_eq!(StringUtil::convert_to_bool("true"), Some(true));
        assert_eq!(StringUtil::convert_to_bool(" TRUE "), Some(true));
        assert_eq!(StringUtil::convert_to_bool("1"), Some(true));
        assert_eq!(StringUtil::convert_to_bool("no"), Some(false));
        assert_eq!(StringUtil::convert_to_bool("0"), Some(false));
        assert_eq!(StringUtil::convert_to_bool(""), None);
        assert_eq!(StringUtil::convert_to_bool("maybe"), None);
    }
}
