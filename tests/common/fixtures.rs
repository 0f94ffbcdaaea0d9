//! Catalog page fixtures

/// One product card in the markup the default selectors expect
pub fn product_card(title: &str, price: &str, brand: &str, image_url: &str) -> String {
    format!(
        r#"<div class="listProduct">
  <img class="stImage lazy" src="/static/placeholder.gif" data-src="{image_url}">
  <a class="listProductBrand" href="/brand">{brand}</a>
  <a class="listProductName" href="/product">
    {title}
  </a>
  <div class="priceBox"><div class="currentPrice"> {price} </div></div>
</div>"#
    )
}

/// Full catalog page around the given cards
pub fn catalog_page(cards: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Pet Shop</title></head>
<body>
<div class="productList">
{}
</div>
</body>
</html>"#,
        cards.join("\n")
    )
}

/// Small fake JPEG body (SOI marker, filler, EOI marker)
pub fn jpeg_bytes(fill: u8) -> Vec<u8> {
    let mut body = vec![0xFF, 0xD8];
    body.extend(std::iter::repeat(fill).take(512));
    body.extend([0xFF, 0xD9]);
    body
}
