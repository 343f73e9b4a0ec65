/// Leftmost `D.D.D.D` in `line`, one to three digits per group, octets not range checked.
pub fn extract_ipv4(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();

    (0..bytes.len())
        .filter(|&start| bytes[start].is_ascii_digit())
        .find_map(|start| match_octets(bytes, start, 4).map(|end| &line[start..end]))
}

fn match_octets(bytes: &[u8], pos: usize, remaining: u8) -> Option<usize> {
    let digits = bytes[pos..]
        .iter()
        .take(3)
        .take_while(|b| b.is_ascii_digit())
        .count();

    for len in (1..=digits).rev() {
        let end = pos + len;
        if remaining == 1 {
            return Some(end);
        }
        if bytes.get(end) == Some(&b'.') {
            if let Some(found) = match_octets(bytes, end + 1, remaining - 1) {
                return Some(found);
            }
        }
    }

    None
}
