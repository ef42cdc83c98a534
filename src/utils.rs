/// Bytes per hex dump row.
const ROW_SIZE: usize = 16;

/// Render `data` as rows of 16 upper case hex bytes prefixed with the
/// decimal offset, "000:  44 53 32 ...".
pub fn hexdump(data: &[u8]) -> String {
    let mut dump = String::with_capacity(data.len() * 3 + data.len() / ROW_SIZE * 8 + 8);

    for (row, chunk) in data.chunks(ROW_SIZE).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        dump.push_str(&format!("{:03}:  {}\n", row * ROW_SIZE, bytes.join(" ")));
    }

    dump
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_of_sixteen() {
        let data: Vec<u8> = (0..40).collect();
        let dump = hexdump(&data);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "000:  00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F");
        assert_eq!(lines[1], "016:  10 11 12 13 14 15 16 17 18 19 1A 1B 1C 1D 1E 1F");
        assert_eq!(lines[2], "032:  20 21 22 23 24 25 26 27");
    }

    #[test]
    fn full_block_offsets() {
        let dump = hexdump(&[0xFF; 512]);
        assert_eq!(dump.lines().count(), 32);
        assert!(dump.lines().last().unwrap().starts_with("496:  FF"));
    }
}
