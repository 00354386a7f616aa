//! Keyboard decoding for the viewer loop

/// Navigation keys the viewer reacts to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Quit,
    Other,
}

const ESC: u8 = 0x1b;

/// Read one key press from a byte stream
///
/// Arrow keys arrive as `ESC [ C` (right) and `ESC [ D` (left). Returns
/// `None` once the stream is exhausted.
pub fn read_key<I: Iterator<Item = u8>>(input: &mut I) -> Option<Key> {
    let key = match input.next()? {
        b'q' => Key::Quit,
        ESC => match input.next() {
            Some(b'[') => match input.next() {
                Some(b'C') => Key::Right,
                Some(b'D') => Key::Left,
                _ => Key::Other,
            },
            _ => Key::Other,
        },
        _ => Key::Other,
    };
    Some(key)
}
