/// Cut `s` to at most `max` bytes on a char boundary, for embedding raw
/// service output in error messages.
pub fn truncate_for_error(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut i = max;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        &s[..i]
    }
}
