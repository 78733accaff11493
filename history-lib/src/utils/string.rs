use std::cmp::Ordering;

/// Compare two labels the way a pt-BR collator orders them.
///
/// Letters compare case- and accent-insensitively first ("ácido" sorts with
/// "acido", before "Bilirrubina"), punctuation and spaces sort before digits and
/// digits before letters. Ties are broken by accents, then by case with
/// lowercase first, then ordinally, so the order is total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .map(primary_key)
        .cmp(b.chars().map(primary_key));
    if primary != Ordering::Equal {
        return primary;
    }

    let accents = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if accents != Ordering::Equal {
        return accents;
    }

    let case = a
        .chars()
        .map(char::is_uppercase)
        .cmp(b.chars().map(char::is_uppercase));
    case.then_with(|| a.cmp(b))
}

fn primary_key(c: char) -> (u8, char) {
    let folded = fold_diacritic(c.to_lowercase().next().unwrap_or(c));
    let class = if folded.is_alphabetic() {
        2
    } else if folded.is_numeric() {
        1
    } else {
        0
    };
    (class, folded)
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'š' | 'ş' => 's',
        'ť' | 'ţ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
