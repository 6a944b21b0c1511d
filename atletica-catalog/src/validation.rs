use atletica_core::{ShopError, ShopResult, MAX_UNIT_PRICE_CENTS};

pub fn product_name(raw: &str) -> ShopResult<String> {
    let name = raw.trim();
    if !(2..=100).contains(&name.chars().count()) {
        return Err(ShopError::invalid("product name must have 2 to 100 characters"));
    }
    Ok(name.to_string())
}

pub fn price(cents: i64) -> ShopResult<i64> {
    if cents < 0 {
        return Err(ShopError::invalid(format!("price cannot be negative, got {}", cents)));
    }
    if cents > MAX_UNIT_PRICE_CENTS {
        return Err(ShopError::invalid(format!(
            "price cannot exceed {} cents, got {}",
            MAX_UNIT_PRICE_CENTS, cents
        )));
    }
    Ok(cents)
}

pub fn non_negative(field: &str, value: i32) -> ShopResult<i32> {
    if value < 0 {
        return Err(ShopError::invalid(format!("{} cannot be negative, got {}", field, value)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_name() {
        assert_eq!(product_name("  Caneca ").unwrap(), "Caneca");
        assert!(product_name("   ").is_err());
        assert!(product_name("X").is_err());
        assert!(product_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_price_and_quantities() {
        assert_eq!(price(0).unwrap(), 0);
        assert!(price(-1).is_err());
        assert_eq!(price(MAX_UNIT_PRICE_CENTS).unwrap(), MAX_UNIT_PRICE_CENTS);
        assert!(price(MAX_UNIT_PRICE_CENTS + 1).is_err());
        assert!(price(i64::MAX).is_err());
        assert!(non_negative("stock_quantity", -3).is_err());
    }
}
