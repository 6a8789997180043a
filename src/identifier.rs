use crate::types::LoanId;

/// derive the next loan identifier from the identifiers already on file
///
/// Every digit character in an existing identifier contributes to its
/// numeric value ("PM001" and "PM-001" both read as 1); identifiers with no
/// digits, or whose digits do not fit an integer, are skipped. The next
/// identifier is `prefix` plus max+1, zero-padded to `width`.
///
/// Not a race-free counter: two concurrent creations that both scan before
/// either commits will allocate the same identifier. Acceptable for small,
/// single-writer datasets; a monotonic sequence can replace this while
/// keeping the external format.
pub fn next_loan_id<'a, I>(existing: I, prefix: &str, width: usize) -> LoanId
where
    I: IntoIterator<Item = &'a str>,
{
    let mut max_seen: u64 = 0;
    for id in existing {
        let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            continue;
        }
        if let Ok(number) = digits.parse::<u64>() {
            max_seen = max_seen.max(number);
        }
    }
    format!("{}{:0width$}", prefix, max_seen + 1)
}
