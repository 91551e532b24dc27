/// Whether the brackets `() [] {}` in `expression` are balanced and properly
/// nested. Other characters are ignored.
pub fn is_matched(expression: &str) -> bool {
    let mut pending = Vec::new();

    for c in expression.chars() {
        match c {
            '(' => pending.push(')'),
            '[' => pending.push(']'),
            '{' => pending.push('}'),
            ')' | ']' | '}' => {
                if pending.pop() != Some(c) {
                    return false;
                }
            }
            _ => {}
        }
    }

    pending.is_empty()
}
