//! Spoken Russian number words to integers.
//!
//! "две тысячи пятьсот" → 2500: value words accumulate into a sub-total, and a
//! scale word multiplies the sub-total and flushes it into the grand total.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumeralError {
    #[error("no number words given")]
    Empty,
    #[error("`{0}` is not a number word")]
    UnknownWord(String),
    #[error("number is too large")]
    Overflow,
}

enum Word {
    Value(u64),
    Scale(u64),
    Skip,
}

fn classify(word: &str) -> Option<Word> {
    let value = match word {
        "и" | "ноль" => return Some(Word::Skip),
        "один" | "одна" | "одно" => 1,
        "два" | "две" => 2,
        "три" => 3,
        "четыре" => 4,
        "пять" => 5,
        "шесть" => 6,
        "семь" => 7,
        "восемь" => 8,
        "девять" => 9,
        "десять" => 10,
        "одиннадцать" => 11,
        "двенадцать" => 12,
        "тринадцать" => 13,
        "четырнадцать" => 14,
        "пятнадцать" => 15,
        "шестнадцать" => 16,
        "семнадцать" => 17,
        "восемнадцать" => 18,
        "девятнадцать" => 19,
        "двадцать" => 20,
        "тридцать" => 30,
        "сорок" => 40,
        "пятьдесят" => 50,
        "шестьдесят" => 60,
        "семьдесят" => 70,
        "восемьдесят" => 80,
        "девяносто" => 90,
        "сто" => 100,
        "двести" => 200,
        "триста" => 300,
        "четыреста" => 400,
        "пятьсот" => 500,
        "шестьсот" => 600,
        "семьсот" => 700,
        "восемьсот" => 800,
        "девятьсот" => 900,
        "тысяча" | "тысячи" | "тысяч" => return Some(Word::Scale(1_000)),
        "миллион" | "миллиона" | "миллионов" => return Some(Word::Scale(1_000_000)),
        "миллиард" | "миллиарда" | "миллиардов" => return Some(Word::Scale(1_000_000_000)),
        _ => return None,
    };
    Some(Word::Value(value))
}

pub fn parse(text: &str) -> Result<u64, NumeralError> {
    let text = text.to_lowercase();
    let mut words = text.split_whitespace().peekable();
    if words.peek().is_none() {
        return Err(NumeralError::Empty);
    }

    let mut total: u64 = 0;
    let mut current: u64 = 0;
    for word in words {
        match classify(word) {
            Some(Word::Value(value)) => {
                current = current.checked_add(value).ok_or(NumeralError::Overflow)?;
            }
            // a bare "тысяча" means one thousand
            Some(Word::Scale(scale)) => {
                let scaled = current.max(1).checked_mul(scale).ok_or(NumeralError::Overflow)?;
                total = total.checked_add(scaled).ok_or(NumeralError::Overflow)?;
                current = 0;
            }
            Some(Word::Skip) => {}
            None => return Err(NumeralError::UnknownWord(word.to_string())),
        }
    }
    total.checked_add(current).ok_or(NumeralError::Overflow)
}
