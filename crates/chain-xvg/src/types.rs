use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::amount::{serde_amount, serde_amount_opt, DEFAULT_NETWORK_FEE};
use crate::error::XvgError;

/// Identity of a UTXO: originating transaction id and output index.
///
/// Rendered externally as `"txid|vout"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtxoRef {
    pub txid: String,
    pub vout: u32,
}

impl UtxoRef {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
        }
    }
}

impl fmt::Display for UtxoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.txid, self.vout)
    }
}

impl FromStr for UtxoRef {
    type Err = XvgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, vout) = s
            .rsplit_once('|')
            .ok_or_else(|| XvgError::InvalidParams(format!("invalid UTXO reference '{s}'")))?;
        if txid.is_empty() {
            return Err(XvgError::InvalidParams(format!(
                "invalid UTXO reference '{s}': empty txid"
            )));
        }
        let vout = vout
            .parse()
            .map_err(|e| XvgError::InvalidParams(format!("invalid UTXO reference '{s}': {e}")))?;
        Ok(Self::new(txid, vout))
    }
}

impl Serialize for UtxoRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UtxoRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An unspent output as reported by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    #[serde(with = "serde_amount")]
    pub value: Decimal,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub address: String,
}

impl Utxo {
    pub fn reference(&self) -> UtxoRef {
        UtxoRef::new(self.txid.clone(), self.vout)
    }
}

/// A spending address and the amount it contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    pub address: String,
    #[serde(with = "serde_amount")]
    pub value: Decimal,
}

impl TxInput {
    pub fn new(address: impl Into<String>, value: Decimal) -> Self {
        Self {
            address: address.into(),
            value,
        }
    }
}

/// A recipient address and the amount it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    #[serde(with = "serde_amount")]
    pub value: Decimal,
}

impl TxOutput {
    pub fn new(address: impl Into<String>, value: Decimal) -> Self {
        Self {
            address: address.into(),
            value,
        }
    }
}

/// Resolved fee. `properties` is opaque to this crate and carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    #[serde(with = "serde_amount")]
    pub network_fee: Decimal,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Default for Fee {
    fn default() -> Self {
        Self {
            network_fee: DEFAULT_NETWORK_FEE,
            properties: BTreeMap::new(),
        }
    }
}

/// Fee as supplied by a caller; both parts may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    #[serde(default, with = "serde_amount_opt", skip_serializing_if = "Option::is_none")]
    pub network_fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, serde_json::Value>>,
}

impl FeeRequest {
    /// Fill in the default network fee and empty properties.
    pub fn resolve(&self) -> Fee {
        Fee {
            network_fee: self.network_fee.unwrap_or(DEFAULT_NETWORK_FEE),
            properties: self.properties.clone().unwrap_or_default(),
        }
    }
}

/// A single object or a list of them. Both forms normalize to a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::<T>::deserialize(deserializer).map(OneOrMany::into_vec)
}

/// A spend request as handed to the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub from: OneOrMany<TxInput>,
    pub to: OneOrMany<TxOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<FeeRequest>,
    /// Per address, UTXOs already consumed by earlier builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent: Option<BTreeMap<String, Vec<UtxoRef>>>,
}

impl BuildRequest {
    pub fn new(from: Vec<TxInput>, to: Vec<TxOutput>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            fee: None,
            spent: None,
        }
    }

    pub fn with_network_fee(mut self, network_fee: Decimal) -> Self {
        self.fee.get_or_insert_with(FeeRequest::default).network_fee = Some(network_fee);
        self
    }

    pub fn with_spent(mut self, address: impl Into<String>, refs: Vec<UtxoRef>) -> Self {
        self.spent
            .get_or_insert_with(BTreeMap::new)
            .insert(address.into(), refs);
        self
    }
}

/// Field names a built transaction may carry; anything else is rejected at
/// signing time.
pub const BUILD_RESULT_FIELDS: [&str; 5] = ["from", "to", "fee", "spent", "utxo"];

/// Normalized, signable transaction.
///
/// For every address, `utxo[address]` is the fetched set minus
/// `spent[address]`. Field order here is the canonical encoding order used
/// for the transaction hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    #[serde(deserialize_with = "one_or_many")]
    pub from: Vec<TxInput>,
    #[serde(deserialize_with = "one_or_many")]
    pub to: Vec<TxOutput>,
    #[serde(default)]
    pub fee: Fee,
    #[serde(default)]
    pub spent: BTreeMap<String, Vec<UtxoRef>>,
    #[serde(default)]
    pub utxo: BTreeMap<String, Vec<UtxoRef>>,
}

/// Ordered DER signatures plus the whole-transaction digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTx {
    /// Hex DER signatures, one per `from` entry, same order.
    pub signed_data: Vec<String>,
    pub tx_hash: String,
}

impl SignedTx {
    /// JSON array of the signatures, as handed to a broadcast endpoint.
    pub fn broadcast_payload(&self) -> String {
        serde_json::Value::from(self.signed_data.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn utxo_ref_display_and_parse() {
        let r = UtxoRef::new("t1", 0);
        assert_eq!(r.to_string(), "t1|0");
        assert_eq!("t1|0".parse::<UtxoRef>().unwrap(), r);
    }

    #[test]
    fn utxo_ref_parse_errors() {
        assert!("no-separator".parse::<UtxoRef>().is_err());
        assert!("|3".parse::<UtxoRef>().is_err());
        assert!("abc|x".parse::<UtxoRef>().is_err());
        assert!("abc|-1".parse::<UtxoRef>().is_err());
    }

    #[test]
    fn utxo_ref_serializes_as_string() {
        let refs = vec![UtxoRef::new("aa", 1), UtxoRef::new("bb", 2)];
        assert_eq!(serde_json::to_value(&refs).unwrap(), json!(["aa|1", "bb|2"]));
        let back: Vec<UtxoRef> = serde_json::from_value(json!(["aa|1", "bb|2"])).unwrap();
        assert_eq!(back, refs);
    }

    #[test]
    fn utxo_defaults_and_reference() {
        let utxo: Utxo = serde_json::from_value(json!({
            "txid": "t1", "vout": 3, "value": "1.5"
        }))
        .unwrap();
        assert_eq!(utxo.confirmations, 0);
        assert_eq!(utxo.address, "");
        assert_eq!(utxo.value, Decimal::new(15, 1));
        assert_eq!(utxo.reference().to_string(), "t1|3");
    }

    #[test]
    fn build_request_accepts_single_objects() {
        let req: BuildRequest = serde_json::from_value(json!({
            "from": {"address": "A", "value": "1.0"},
            "to": [{"address": "B", "value": 1}],
            "fee": {"networkFee": 0.01, "properties": {}}
        }))
        .unwrap();
        assert_eq!(req.from.clone().into_vec().len(), 1);
        assert_eq!(req.to.clone().into_vec()[0].value, Decimal::ONE);
        assert_eq!(req.fee.unwrap().network_fee, Some(Decimal::new(1, 2)));
        assert!(req.spent.is_none());
    }

    #[test]
    fn fee_request_resolves_defaults() {
        let fee = FeeRequest::default().resolve();
        assert_eq!(fee.network_fee, DEFAULT_NETWORK_FEE);
        assert!(fee.properties.is_empty());

        let mut props = BTreeMap::new();
        props.insert("feeRate".to_string(), json!(2));
        let fee = FeeRequest {
            network_fee: Some(Decimal::new(5, 2)),
            properties: Some(props.clone()),
        }
        .resolve();
        assert_eq!(fee.network_fee, Decimal::new(5, 2));
        assert_eq!(fee.properties, props);
    }

    #[test]
    fn build_result_serializes_in_canonical_order() {
        let result = BuildResult {
            from: vec![TxInput::new("A", Decimal::ONE)],
            to: vec![TxOutput::new("B", Decimal::ONE)],
            fee: Fee::default(),
            spent: BTreeMap::new(),
            utxo: BTreeMap::from([("A".to_string(), vec![UtxoRef::new("t1", 0)])]),
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"from":[{"address":"A","value":"1"}],"to":[{"address":"B","value":"1"}],"fee":{"networkFee":"0.1","properties":{}},"spent":{},"utxo":{"A":["t1|0"]}}"#
        );
    }

    #[test]
    fn build_result_normalizes_single_from() {
        let result: BuildResult = serde_json::from_value(json!({
            "from": {"address": "A", "value": "1"},
            "to": {"address": "B", "value": "1"}
        }))
        .unwrap();
        assert_eq!(result.from.len(), 1);
        assert_eq!(result.to.len(), 1);
        assert_eq!(result.fee, Fee::default());
    }

    #[test]
    fn signed_tx_camel_case_and_payload() {
        let signed = SignedTx {
            signed_data: vec!["3044aa".into(), "3045bb".into()],
            tx_hash: "ff".repeat(32),
        };
        let value = serde_json::to_value(&signed).unwrap();
        assert!(value.get("signedData").is_some());
        assert!(value.get("txHash").is_some());
        assert_eq!(signed.broadcast_payload(), r#"["3044aa","3045bb"]"#);
    }
}
