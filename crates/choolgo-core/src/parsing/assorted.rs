use crate::model::ExtractionResult;

/// Spread `total` units evenly over `products` in list order.
///
/// Each product gets `total / n`; the first `total % n` products get one
/// more. Products that end up with zero units are omitted.
pub fn distribute(total: u32, products: &[String]) -> Vec<ExtractionResult> {
    if products.is_empty() {
        return Vec::new();
    }

    let n = products.len() as u32;
    let per_item = total / n;
    let remainder = total % n;

    products
        .iter()
        .enumerate()
        .filter_map(|(i, product)| {
            let q = per_item + u32::from((i as u32) < remainder);
            (q > 0).then(|| ExtractionResult::new(product.clone(), q))
        })
        .collect()
}
