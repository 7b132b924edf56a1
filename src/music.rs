use crate::waveform::Note;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PianoKey {
    pub label: char,
    pub frequency_hz: f64,
    /// Computer keyboard key which plays this piano key
    pub binding: char,
}

impl PianoKey {
    const fn new(label: char, frequency_hz: f64, binding: char) -> Self {
        Self {
            label,
            frequency_hz,
            binding,
        }
    }

    pub fn note(&self) -> Note {
        Note::new(self.frequency_hz)
    }
}

pub const PIANO_KEYS: [PianoKey; 7] = [
    PianoKey::new('C', 261.63, 'a'),
    PianoKey::new('D', 293.66, 's'),
    PianoKey::new('E', 329.63, 'd'),
    PianoKey::new('F', 349.23, 'f'),
    PianoKey::new('G', 392.00, 'g'),
    PianoKey::new('A', 440.00, 'h'),
    PianoKey::new('B', 493.88, 'j'),
];

/// Index into `PIANO_KEYS` of the key bound to `ch`, ignoring case
pub fn key_index_for_binding(ch: char) -> Option<usize> {
    let ch = ch.to_ascii_lowercase();
    PIANO_KEYS.iter().position(|key| key.binding == ch)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keys_ascend_in_pitch() {
        let labels = PIANO_KEYS.iter().map(|key| key.label).collect::<String>();
        assert_eq!(labels, "CDEFGAB");
        assert!(PIANO_KEYS
            .windows(2)
            .all(|pair| pair[0].frequency_hz < pair[1].frequency_hz));
        assert_eq!(PIANO_KEYS[5].frequency_hz, 440.0);
    }

    #[test]
    fn bindings() {
        assert_eq!(key_index_for_binding('a'), Some(0));
        assert_eq!(key_index_for_binding('J').map(|i| PIANO_KEYS[i].label), Some('B'));
        assert!(key_index_for_binding('z').is_none());
    }

    #[test]
    fn key_note_lasts_one_second() {
        let note = PIANO_KEYS[0].note();
        assert_eq!(note.frequency_hz, 261.63);
        assert_eq!(note.duration_s, 1.0);
    }
}
