use core_types::{Direction, OptionChainSnapshot, OptionLeg};
use rust_decimal::Decimal;

/// The at-the-money strike for `price`.
///
/// With a strike step the price is rounded to the nearest multiple (half-way cases go to
/// the even multiple). Without one the nearest listed strike is used, the lower on a tie.
pub fn find_atm_strike(
    price: Decimal,
    strike_step: Option<Decimal>,
    chain: &OptionChainSnapshot,
) -> Option<Decimal> {
    match strike_step {
        Some(step) if step > Decimal::ZERO => Some((price / step).round() * step),
        _ => chain
            .strikes
            .iter()
            .map(|s| s.strike_price)
            .min_by(|a, b| {
                (*a - price)
                    .abs()
                    .cmp(&(*b - price).abs())
                    .then_with(|| a.cmp(b))
            }),
    }
}

/// The call (`Bull`) or put (`Bear`) listed at the ATM strike.
pub fn select_option<'a>(
    chain: &'a OptionChainSnapshot,
    price: Decimal,
    strike_step: Option<Decimal>,
    direction: Direction,
) -> Option<(Decimal, &'a OptionLeg)> {
    let strike = find_atm_strike(price, strike_step, chain)?;
    let leg = chain.strike(strike)?.leg(direction)?;
    Some((strike, leg))
}
