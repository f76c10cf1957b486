pub fn check_control_whitespace<G>(
    given: G,
    max_chars: Option<usize>
) -> bool
where
    G: AsRef<str>
{
    let given_ref = given.as_ref();
    let mut iter = given_ref.chars();
    let mut char_count = 0;

    if let Some(max_chars) = max_chars {
        while let Some(ch) = iter.next() {
            if ch.is_control() || ch.is_whitespace() {
                return false;
            }

            char_count += 1;

            if char_count > max_chars {
                return false;
            }
        }
    } else {
        while let Some(ch) = iter.next() {
            if ch.is_control() || ch.is_whitespace() {
                return false;
            }
        }
    }

    true
}

pub const MAX_MODULE_CHARS: usize = 64;

pub fn module_name_valid(given: &str) -> bool {
    !given.is_empty() && check_control_whitespace(given, Some(MAX_MODULE_CHARS))
}

pub const MAX_LANGUAGE_CHARS: usize = 35;

pub fn language_tag_valid(given: &str) -> bool {
    let mut char_count = 0;

    for ch in given.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' {
            return false;
        }

        char_count += 1;

        if char_count > MAX_LANGUAGE_CHARS {
            return false;
        }
    }

    char_count != 0
}
