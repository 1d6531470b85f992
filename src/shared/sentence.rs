// Framing for PERD* sentences: `$FIELD1,FIELD2,...*CC`.
// The line terminator is not part of the frame; the serial session appends it.

pub const TERMINATOR: &str = "\r\n";

// XOR of every payload byte, i.e. everything between `$` and `*`.
pub fn checksum(payload: &str) -> u8 {
    payload.bytes().fold(0_u8, |acc, byte| acc ^ byte)
}

// Join fields with commas and wrap them in `$...*CC`.
// Fields are not validated; a field containing `,` or `*` yields a malformed frame.
pub fn build<S: AsRef<str>>(fields: &[S]) -> String {
    let payload = fields
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    format!("${}*{:02X}", payload, checksum(&payload))
}

// Recompute the checksum of a framed sentence and compare it with the transmitted one.
// Returns None when the text is not framed as `$payload*CC`.
pub fn verify(sentence: &str) -> Option<bool> {
    let body = sentence.trim_end_matches(['\r', '\n']).strip_prefix('$')?;
    let (payload, transmitted) = body.rsplit_once('*')?;
    if transmitted.len() != 2 || !transmitted.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let transmitted = u8::from_str_radix(transmitted, 16).ok()?;
    Some(checksum(payload) == transmitted)
}
