// convert a count to readable format, e.g. 1234567 -> 1,234,567
pub fn readable_uint(n: u64) -> String {
    let mut s = String::new();
    for (i, char) in n.to_string().chars().rev().enumerate() {
        if i % 3 == 0 && i != 0 {
            s.insert(0, ',');
        }
        s.insert(0, char);
    }
    s
}

/// Like counts can dip below zero when an optimistic toggle races the
/// backend; those are shown as zero.
pub fn readable_count(n: i64) -> String {
    readable_uint(n.max(0) as u64)
}

pub fn pluralize(n: i64, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}
