//! Edit distance between short identifiers.

/// Levenshtein distance: the minimum number of single-character insertions,
/// deletions, or substitutions turning `a` into `b`.
///
/// Characters are Unicode scalar values, so `"é"` counts as one edit, not two.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // table[j][i] = distance(b[..j], a[..i])
    let mut table = vec![vec![0usize; a.len() + 1]; b.len() + 1];
    for (i, cell) in table[0].iter_mut().enumerate() {
        *cell = i;
    }
    for (j, row) in table.iter_mut().enumerate() {
        row[0] = j;
    }

    for j in 1..=b.len() {
        for i in 1..=a.len() {
            table[j][i] = if b[j - 1] == a[i - 1] {
                table[j - 1][i - 1]
            } else {
                1 + table[j - 1][i].min(table[j][i - 1]).min(table[j - 1][i - 1])
            };
        }
    }

    table[b.len()][a.len()]
}
