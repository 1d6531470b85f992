use crate::shared::sentence;

const ACK_TALKER: &str = "PERDACK";
const MAX_SENTENCE_LEN: usize = 160;

// Passive view over the echoed response stream.
// It never changes what is echoed or when the drain loop stops.
#[derive(Debug, Default)]
pub struct ResponseMonitor {
    collector: NmeaSentenceCollector,
    pub sentences: usize,
    pub acks: Vec<Acknowledgement>,
    pub bad_checksums: usize,
}

// A `$PERDACK` sentence: the acknowledged command followed by its status fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub command: String,
    pub status: Vec<String>,
}

impl ResponseMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    // Feed raw serial bytes; complete sentences are checked and acknowledgements retained.
    pub fn ingest(&mut self, bytes: &[u8]) {
        let mut complete = Vec::new();
        self.collector.push_bytes(bytes, &mut complete);

        for raw in complete {
            self.sentences += 1;
            // A `*` with an unparsable checksum field counts as corrupt; no `*` means no checksum.
            let corrupt = match sentence::verify(&raw) {
                Some(valid) => !valid,
                None => raw.contains('*'),
            };
            if corrupt {
                self.bad_checksums += 1;
                tracing::warn!(sentence = %raw, "response sentence has a bad checksum");
                continue;
            }

            let Some(fields) = parse_nmea_fields(&raw) else {
                continue;
            };
            if field(&fields, 0) != ACK_TALKER {
                continue;
            }

            let ack = Acknowledgement {
                command: field(&fields, 1).to_string(),
                status: fields.iter().skip(2).map(|f| f.to_string()).collect(),
            };
            tracing::info!(
                command = %nz(&ack.command),
                status = %ack.status.join(","),
                "receiver acknowledged"
            );
            self.acks.push(ack);
        }
    }
}

// Extract complete NMEA sentences from arbitrary serial bytes.
#[derive(Debug, Default)]
struct NmeaSentenceCollector {
    capturing: bool,
    buf: Vec<u8>,
}

impl NmeaSentenceCollector {
    fn push_bytes(&mut self, bytes: &[u8], out: &mut Vec<String>) {
        for &byte in bytes {
            if byte == b'$' {
                // A nested '$' restarts capture so one garbled line does not swallow the next.
                self.capturing = true;
                self.buf.clear();
                self.buf.push(byte);
                continue;
            }
            if !self.capturing {
                continue;
            }

            if byte == b'\n' {
                if let Ok(raw) = std::str::from_utf8(&self.buf) {
                    out.push(raw.trim_end_matches('\r').to_string());
                }
                self.reset();
                continue;
            }

            if !is_allowed_nmea_byte(byte) || self.buf.len() >= MAX_SENTENCE_LEN {
                self.reset();
                continue;
            }

            self.buf.push(byte);
        }
    }

    fn reset(&mut self) {
        self.capturing = false;
        self.buf.clear();
    }
}

fn parse_nmea_fields(sentence: &str) -> Option<Vec<&str>> {
    let core = sentence
        .strip_prefix('$')?
        .split('*')
        .next()
        .unwrap_or_default();
    Some(core.split(',').collect())
}

fn field<'a>(fields: &'a [&'a str], idx: usize) -> &'a str {
    fields.get(idx).copied().unwrap_or("")
}

fn nz(raw: &str) -> &str {
    if raw.is_empty() { "-" } else { raw }
}

fn is_allowed_nmea_byte(byte: u8) -> bool {
    byte == b'\r' || (0x20..=0x7E).contains(&byte)
}
