// Fields pulled off a WooCommerce product page, before any normalization.
//
// page
//  ├── h1.product_title                          -> name
//  ├── p.price span.woocommerce-Price-amount bdi -> price_tokens (one per variant)
//  ├── button.single_add_to_cart_button          -> has_add_to_cart
//  ├── p.stock.out-of-stock                      -> out_of_stock_marker
//  ├── input.qty[max]                            -> quantity
//  └── meta[og:image] / gallery img              -> image_url

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProduct {
    pub url: String,
    pub name: Option<String>,
    pub price_tokens: Vec<String>,
    pub has_add_to_cart: bool,
    pub out_of_stock_marker: bool,
    pub quantity: Option<String>,
    pub image_url: Option<String>,
}
