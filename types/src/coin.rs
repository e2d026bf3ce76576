//! Validated coin amounts in canonical form.
//!
//! A [`Coin`] carries an arbitrary-precision, non-negative amount. A [`Coins`] list is
//! always sorted by denomination with each denomination appearing once, which is the
//! form host messages require for deterministic hashing.

use crate::codec::{read_string, string_encode_size, write_string, MAX_LIST_LENGTH};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a denomination, including the leading letter.
pub const MAX_DENOM_LENGTH: usize = 128;

/// Minimum length of a denomination, including the leading letter.
pub const MIN_DENOM_LENGTH: usize = 3;

/// Maximum number of decimal digits accepted in an encoded amount.
pub const MAX_AMOUNT_DIGITS: usize = 4096;

/// Checks a denomination against `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn is_valid_denom(denom: &str) -> bool {
    let bytes = denom.as_bytes();
    if bytes.len() < MIN_DENOM_LENGTH || bytes.len() > MAX_DENOM_LENGTH {
        return false;
    }
    if !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'))
}

/// Parses a base-10 amount made only of ASCII digits.
pub fn parse_amount(amount: &str) -> Option<BigUint> {
    if amount.is_empty()
        || amount.len() > MAX_AMOUNT_DIGITS
        || !amount.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    BigUint::parse_bytes(amount.as_bytes(), 10)
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "serde_amount")]
    pub amount: BigUint,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<BigUint>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

mod serde_amount {
    use super::parse_amount;
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_amount(&s).ok_or_else(|| serde::de::Error::custom("invalid coin amount"))
    }
}

impl Write for Coin {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.denom, writer);
        write_string(&self.amount.to_string(), writer);
    }
}

impl Read for Coin {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let denom = read_string(reader, MAX_DENOM_LENGTH)?;
        if !is_valid_denom(&denom) {
            return Err(Error::Invalid("Coin", "invalid denom"));
        }
        let amount = read_string(reader, MAX_AMOUNT_DIGITS)?;
        let amount = parse_amount(&amount).ok_or(Error::Invalid("Coin", "invalid amount"))?;
        Ok(Self { denom, amount })
    }
}

impl EncodeSize for Coin {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.denom) + string_encode_size(&self.amount.to_string())
    }
}

/// Coins sorted by denomination, one entry per denomination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coin`, summing into an existing entry with the same denomination.
    pub fn add(&mut self, coin: Coin) {
        match self
            .0
            .binary_search_by(|existing| existing.denom.as_str().cmp(&coin.denom))
        {
            Ok(index) => self.0[index].amount += coin.amount,
            Err(index) => self.0.insert(index, coin),
        }
    }

    pub fn amount_of(&self, denom: &str) -> BigUint {
        self.0
            .binary_search_by(|existing| existing.denom.as_str().cmp(denom))
            .map(|index| self.0[index].amount.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Coin] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Coin> {
        self.0
    }

    fn is_canonical(coins: &[Coin]) -> bool {
        coins.windows(2).all(|pair| pair[0].denom < pair[1].denom)
    }
}

impl FromIterator<Coin> for Coins {
    fn from_iter<I: IntoIterator<Item = Coin>>(iter: I) -> Self {
        let mut coins = Coins::new();
        for coin in iter {
            coins.add(coin);
        }
        coins
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = &'static str;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        if !Self::is_canonical(&coins) {
            return Err("coins must be sorted by denom without duplicates");
        }
        Ok(Self(coins))
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, coin) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

impl Write for Coins {
    fn write(&self, writer: &mut impl BufMut) {
        crate::codec::write_list(&self.0, writer);
    }
}

impl Read for Coins {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let coins = crate::codec::read_list::<Coin>(reader, MAX_LIST_LENGTH)?;
        Coins::try_from(coins).map_err(|_| Error::Invalid("Coins", "not canonical"))
    }
}

impl EncodeSize for Coins {
    fn encode_size(&self) -> usize {
        crate::codec::list_encode_size(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::{DecodeExt, Encode};

    #[test]
    fn denom_syntax() {
        assert!(is_valid_denom("stake"));
        assert!(is_valid_denom(
            "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
        ));
        assert!(is_valid_denom("factory/cosmos1abc/sub.token_v2-x:y"));
        assert!(!is_valid_denom("ab"));
        assert!(!is_valid_denom("1atom"));
        assert!(!is_valid_denom("at om"));
        assert!(!is_valid_denom(&format!("a{}", "b".repeat(128))));
    }

    #[test]
    fn parse_amount_requires_plain_digits() {
        assert_eq!(parse_amount("0"), Some(BigUint::from(0u8)));
        assert_eq!(parse_amount("0012"), Some(BigUint::from(12u8)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-1"), None);
        assert_eq!(parse_amount("+1"), None);
        assert_eq!(parse_amount(" 1"), None);
        assert_eq!(parse_amount("1.5"), None);
    }

    #[test]
    fn add_keeps_canonical_order() {
        let mut coins = Coins::new();
        coins.add(Coin::new("uosmo", 5u32));
        coins.add(Coin::new("uatom", 1u32));
        coins.add(Coin::new("uosmo", 7u32));

        let denoms: Vec<_> = coins.iter().map(|c| c.denom.as_str()).collect();
        assert_eq!(denoms, vec!["uatom", "uosmo"]);
        assert_eq!(coins.amount_of("uosmo"), BigUint::from(12u32));
        assert_eq!(coins.amount_of("ujuno"), BigUint::from(0u32));
        assert_eq!(coins.to_string(), "1uatom,12uosmo");
    }

    #[test]
    fn decode_rejects_unsorted_coins() {
        let unsorted = vec![Coin::new("uosmo", 1u32), Coin::new("uatom", 1u32)];
        let mut buf = Vec::new();
        crate::codec::write_list(&unsorted, &mut buf);
        assert!(matches!(
            Coins::decode(buf.as_slice()),
            Err(Error::Invalid("Coins", "not canonical"))
        ));

        let sorted: Coins = unsorted.into_iter().collect();
        let decoded = Coins::decode(sorted.encode()).expect("canonical coins decode");
        assert_eq!(decoded, sorted);
    }

    #[test]
    fn serde_uses_string_amounts() {
        let coin = Coin::new("stake", 1_000u32);
        let json = serde_json::to_string(&coin).expect("serialize");
        assert_eq!(json, r#"{"denom":"stake","amount":"1000"}"#);
        assert!(serde_json::from_str::<Coins>(
            r#"[{"denom":"b_coin","amount":"1"},{"denom":"a_coin","amount":"1"}]"#
        )
        .is_err());
    }
}
