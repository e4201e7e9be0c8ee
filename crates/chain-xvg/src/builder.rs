//! Turns a spend request into a signable [`BuildResult`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::amount::checked_sum;
use crate::client::NodeClient;
use crate::error::XvgError;
use crate::network::ensure_ticker;
use crate::types::{BuildRequest, BuildResult, Utxo};
use crate::utxo::remaining_refs;

/// Build a transaction from `request`, reading UTXOs through `client`.
///
/// Each distinct sender address is fetched exactly once. The build fails with
/// [`XvgError::InsufficientFunds`] when the fetched UTXOs do not cover the
/// outputs plus the network fee. No coin selection happens here:
/// `utxo[address]` is the full fetched set minus `spent[address]`.
pub async fn build_transaction<C>(
    client: &C,
    ticker: &str,
    request: &BuildRequest,
) -> Result<BuildResult, XvgError>
where
    C: NodeClient + ?Sized,
{
    ensure_ticker(ticker)?;

    let from = request.from.clone().into_vec();
    let to = request.to.clone().into_vec();
    if from.is_empty() || to.is_empty() {
        return Err(XvgError::InvalidParams(
            "missing sender or recipient information".into(),
        ));
    }

    let mut fetched: BTreeMap<String, Vec<Utxo>> = BTreeMap::new();
    let mut total_available = Decimal::ZERO;
    for input in &from {
        if fetched.contains_key(&input.address) {
            continue;
        }
        let utxos = client.utxo_by_address(&input.address).await?;
        let address_total = checked_sum(utxos.iter().map(|u| &u.value))?;
        total_available = checked_sum([&total_available, &address_total])?;
        debug!(
            node = client.name(),
            address = %input.address,
            utxos = utxos.len(),
            %address_total,
            "fetched sender utxos"
        );
        fetched.insert(input.address.clone(), utxos);
    }

    let total_output = checked_sum(to.iter().map(|o| &o.value))?;
    let fee = request.fee.clone().unwrap_or_default().resolve();
    let needed = checked_sum([&total_output, &fee.network_fee])?;
    if total_available < needed {
        return Err(XvgError::InsufficientFunds {
            needed,
            available: total_available,
        });
    }

    let requested_spent = request.spent.as_ref();
    let mut spent = BTreeMap::new();
    let mut utxo = BTreeMap::new();
    for (address, utxos) in &fetched {
        let already = requested_spent
            .and_then(|s| s.get(address))
            .cloned()
            .unwrap_or_default();
        utxo.insert(address.clone(), remaining_refs(utxos, &already));
        spent.insert(address.clone(), already);
    }

    info!(
        inputs = from.len(),
        outputs = to.len(),
        %total_available,
        %total_output,
        fee = %fee.network_fee,
        "transaction built"
    );

    Ok(BuildResult {
        from,
        to,
        fee,
        spent,
        utxo,
    })
}
