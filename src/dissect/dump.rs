use std::fmt::Write;

/// Canonical hex dump: offset, sixteen bytes, ascii gutter.
pub fn hex_dump(data: &[u8], out: &mut String) {
    for (i, chunk) in data.chunks(16).enumerate() {
        let _ = write!(out, " {:05x}  ", i * 16);
        for j in 0..16 {
            match chunk.get(j) {
                Some(b) => {
                    let _ = write!(out, "{b:02x} ");
                }
                None => out.push_str("   "),
            }
            if j == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.push_str(&sanitize(chunk));
        out.push_str("|\n");
    }
}

/// One line of printable characters, everything else replaced by a dot.
pub fn ascii_dump(data: &[u8], out: &mut String) {
    let _ = writeln!(out, " {}", sanitize(data));
}

fn sanitize(data: &[u8]) -> String {
    String::from_utf8_lossy(data).replace(|x: char| !x.is_ascii() || x.is_control(), ".")
}
