//! Text → WinAnsi/Latin-1 bytes for the base-14 fonts.
//!
//! Latin-1 passes through unchanged. Common typography outside it gets an ASCII
//! stand-in, invisible joiners are dropped, and anything else becomes `?`.
//! Encoding never fails.

pub const PLACEHOLDER: u8 = b'?';

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Characters that were transliterated or replaced with the placeholder.
    pub substitutions: usize,
}

pub fn encode(text: &str) -> Encoded {
    let mut out = Encoded {
        bytes: Vec::with_capacity(text.len()),
        substitutions: 0,
    };

    for c in text.chars() {
        let code = c as u32;
        match code {
            // Tabs and stray line breaks read as spaces; other C0/C1 controls vanish.
            0x09 | 0x0A | 0x0D => out.bytes.push(b' '),
            0x00..=0x1F | 0x7F..=0x9F => {}
            0x20..=0x7E | 0xA0..=0xFF => out.bytes.push(code as u8),
            _ if is_invisible(c) => {}
            _ => {
                out.substitutions += 1;
                match transliterate(c) {
                    Some(ascii) => out.bytes.extend_from_slice(ascii.as_bytes()),
                    None => out.bytes.push(PLACEHOLDER),
                }
            }
        }
    }
    out
}

fn is_invisible(c: char) -> bool {
    matches!(c,
        '\u{200B}'..='\u{200F}'     // zero-width space/joiners, direction marks
        | '\u{2060}'..='\u{2064}'   // word joiner, invisible operators
        | '\u{FE00}'..='\u{FE0F}'   // variation selectors
        | '\u{FEFF}'                // byte order mark
        | '\u{1F3FB}'..='\u{1F3FF}' // skin tone modifiers
        | '\u{E0020}'..='\u{E007F}' // tag characters
    )
}

#[rustfmt::skip]
fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        // punctuation
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2212}' => "-",
        '\u{2014}' | '\u{2015}' => "--",
        '\u{2026}' => "...",
        '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{25AA}' | '\u{25CF}' | '\u{25E6}' => "-",
        '\u{2039}' => "<",
        '\u{203A}' => ">",
        '\u{2190}' => "<-",
        '\u{2192}' => "->",
        '\u{2194}' => "<->",
        '\u{21D2}' => "=>",
        '\u{2264}' => "<=",
        '\u{2265}' => ">=",
        '\u{2248}' => "~",
        '\u{2260}' => "!=",
        '\u{2713}' | '\u{2714}' => "v",

        // spaces
        '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => " ",

        // symbols
        '\u{20AC}' => "EUR",
        '\u{20B9}' => "INR",
        '\u{2122}' => "(TM)",
        '\u{2116}' => "No.",

        // ligatures
        '\u{FB00}' => "ff",
        '\u{FB01}' => "fi",
        '\u{FB02}' => "fl",
        '\u{FB03}' => "ffi",
        '\u{FB04}' => "ffl",

        // Latin Extended-A
        'Ā' | 'Ă' | 'Ą' => "A",   'ā' | 'ă' | 'ą' => "a",
        'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C", 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ď' | 'Đ' => "D",         'ď' | 'đ' => "d",
        'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E", 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G", 'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĥ' | 'Ħ' => "H",         'ĥ' | 'ħ' => "h",
        'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I", 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ĵ' => "J",               'ĵ' => "j",
        'Ķ' => "K",               'ķ' => "k",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L", 'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ń' | 'Ņ' | 'Ň' => "N",   'ń' | 'ņ' | 'ň' => "n",
        'Ō' | 'Ŏ' | 'Ő' => "O",   'ō' | 'ŏ' | 'ő' => "o",
        'Œ' => "OE",              'œ' => "oe",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",   'ŕ' | 'ŗ' | 'ř' => "r",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S", 'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'Ţ' | 'Ť' | 'Ŧ' => "T",   'ţ' | 'ť' | 'ŧ' => "t",
        'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U", 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ŵ' => "W",               'ŵ' => "w",
        'Ŷ' | 'Ÿ' => "Y",         'ŷ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",   'ź' | 'ż' | 'ž' => "z",

        // Latin Extended-B / Vietnamese, most frequent
        'Ș' => "S", 'ș' => "s",
        'Ț' => "T", 'ț' => "t",
        'Ơ' => "O", 'ơ' => "o",
        'Ư' => "U", 'ư' => "u",
        _ => return None,
    };
    Some(s)
}
