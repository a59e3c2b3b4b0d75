use core_types::OptionChainSnapshot;
use rust_decimal::Decimal;

/// Put/call ratio: total put open interest over total call open interest.
///
/// An empty chain yields the neutral ratio 1.0. When there is put interest but no call
/// interest at all the ratio is undefined and `None` is returned; callers skip the
/// instrument instead of reading it as an extreme signal.
pub fn calculate_pcr(chain: &OptionChainSnapshot) -> Option<Decimal> {
    if chain.is_empty() {
        return Some(Decimal::ONE);
    }

    let (puts, calls) = chain.strikes.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(puts, calls), strike| {
            let put_oi = strike.put.as_ref().map_or(Decimal::ZERO, |l| l.open_interest);
            let call_oi = strike.call.as_ref().map_or(Decimal::ZERO, |l| l.open_interest);
            (puts + put_oi, calls + call_oi)
        },
    );

    if calls.is_zero() {
        return None;
    }
    Some(puts / calls)
}
