use itertools::{EitherOrBoth, Itertools};
use tvlens_shared_models::{MergedRow, PricePoint, TvlPoint};

/// Inner join of the two series on date, keeping the candle close as price.
///
/// Inputs may arrive in any order. Within an input, duplicate dates collapse
/// first: the last TVL point and the first candle of a day are kept.
pub fn merge(tvl: &[TvlPoint], prices: &[PricePoint]) -> Vec<MergedRow> {
    let mut tvl: Vec<&TvlPoint> = tvl.iter().collect();
    tvl.sort_by_key(|p| p.date);
    tvl.reverse();
    tvl.dedup_by_key(|p| p.date);
    tvl.reverse();

    let mut prices: Vec<&PricePoint> = prices.iter().collect();
    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);

    tvl.into_iter()
        .merge_join_by(prices, |t, p| t.date.cmp(&p.date))
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(t, p) => Some(MergedRow::new(t.date, t.tvl_usd, p.close)),
            _ => None,
        })
        .collect()
}
