use crate::indicators::EvwmaReading;
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Largest possible |score|: 5 + 1 + 5 + 1.
pub const MAX_SCORE: i32 = 12;

const LONG_WEIGHT: i32 = 5;
const SHORT_WEIGHT: i32 = 1;

fn vote(ordering: Ordering, weight: i32) -> i32 {
    match ordering {
        Ordering::Greater => weight,
        Ordering::Less => -weight,
        Ordering::Equal => 0,
    }
}

/// Confluence of price location and trend slope across both EVWMA horizons.
///
/// Price above the long EVWMA and a rising long slope each count 5; the same
/// conditions on the short horizon count 1. Returns 0 when either horizon is undefined.
pub fn microstructure_score(
    price: Decimal,
    short: Option<EvwmaReading>,
    long: Option<EvwmaReading>,
) -> i32 {
    let (Some(short), Some(long)) = (short, long) else {
        return 0;
    };

    let score = vote(price.cmp(&long.value), LONG_WEIGHT)
        + vote(price.cmp(&short.value), SHORT_WEIGHT)
        + vote(long.slope.cmp(&Decimal::ZERO), LONG_WEIGHT)
        + vote(short.slope.cmp(&Decimal::ZERO), SHORT_WEIGHT);

    score.clamp(-MAX_SCORE, MAX_SCORE)
}
