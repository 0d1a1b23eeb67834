//! Benchmark utilities.

use rand::Rng;

/// Generate a random printable ASCII string of the specified length.
pub fn random_ascii(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(' '..='~')).collect()
}

/// Generate a string of the specified length where roughly one
/// character in four needs an escape.
pub fn escape_heavy(len: usize) -> String {
    const SPECIAL: [char; 6] = ['\\', '\n', '\t', '=', '\u{e9}', '\u{1F600}'];
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            if rng.gen_ratio(1, 4) {
                SPECIAL[rng.gen_range(0..SPECIAL.len())]
            } else {
                rng.gen_range('a'..='z')
            }
        })
        .collect()
}

/// Generate a document with `count` entries.
///
/// Every fourth entry carries a comment, every eighth is preceded by a
/// blank line and every sixteenth value is continued over two lines.
pub fn generate_document(count: usize, value_len: usize) -> String {
    let mut doc = String::from("# generated for benchmarks\n\n");
    for i in 0..count {
        if i % 8 == 0 && i > 0 {
            doc.push('\n');
        }
        if i % 4 == 0 {
            doc.push_str(&format!("! entry {i}\n"));
        }
        let value = random_ascii(value_len).replace('\\', "/");
        if i % 16 == 0 {
            doc.push_str(&format!("section.key{i} = {value} \\\n    {value}\n"));
        } else {
            doc.push_str(&format!("section.key{i}={value}\n"));
        }
    }
    doc
}
