//! HTTP transport for the ordering and tracker APIs
//!
//! Every call goes through [`Api`], which owns one `reqwest::Client` and the
//! country's [`Urls`]. Requests are GETs returning JSON (or XML for phone
//! tracking), except the three order endpoints, which take the order payload
//! as a JSON POST. Interpreting responses is left to `pizza_core`.

use crate::config::PizzaConfig;
use crate::prelude::*;
use log::{debug, info};
use pizza_core::address::{Address, ServiceMethod};
use pizza_core::country::Urls;
use pizza_core::menu::Menu;
use pizza_core::order::{check_price, status_ok, Order};
use pizza_core::payment::Payment;
use pizza_core::store::{closest, open_stores, Store};
use pizza_core::tracking::{parse_tracker_xml, OrderStatus};
use reqwest::header::{HeaderValue, CONTENT_TYPE, REFERER, USER_AGENT};
use serde_json::Value;

pub struct Api {
    client: reqwest::Client,
    urls: Urls,
}

impl Api {
    pub fn new(urls: Urls) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pizza/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client, urls })
    }

    pub fn from_config(config: &PizzaConfig) -> Result<Self> {
        Self::new(config.urls())
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        ensure_success(url, response).await
    }

    /// GET an endpoint that answers with JSON
    pub async fn request_json(&self, url: &str) -> Result<Value> {
        self.get(url)
            .await?
            .json()
            .await
            .with_context(|| f!("Failed to parse JSON from {url}"))
    }

    /// GET an endpoint that answers with XML, returning the raw body
    pub async fn request_xml(&self, url: &str) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .with_context(|| f!("Failed to read response from {url}"))
    }

    /// POST the order to one of the order endpoints
    ///
    /// With `merge`, the API's copy of the order is folded back into `order`.
    async fn send_order(&self, url: &str, order: &mut Order, merge: bool) -> Result<Value> {
        let body = order.prepare()?;
        let referer = f!("https://{}/en/pages/order/", order.country.order_domain());

        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .header(REFERER, referer)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let json: Value = ensure_success(url, response)
            .await?
            .json()
            .await
            .with_context(|| f!("Failed to parse order response from {url}"))?;

        if merge {
            order.merge_response(&json)?;
        }

        Ok(json)
    }

    /// Stores near `address` that are online and open for `service`
    pub async fn nearby_stores(&self, address: &Address, service: ServiceMethod) -> Result<Vec<Store>> {
        let url = self
            .urls
            .find_url(&address.line1(), &address.line2(), service.as_str());
        let data = self.request_json(&url).await?;

        Ok(open_stores(&data, service, address.country))
    }

    pub async fn closest_store(&self, address: &Address, service: ServiceMethod) -> Result<Store> {
        let stores = self.nearby_stores(address, service).await?;
        Ok(closest(stores)?)
    }

    pub async fn store_details(&self, store_id: &str) -> Result<Value> {
        self.request_json(&self.urls.info_url(store_id)).await
    }

    pub async fn store_menu(&self, store_id: &str, lang: &str) -> Result<Menu> {
        let data = self.request_json(&self.urls.menu_url(store_id, lang)).await?;
        Ok(Menu::from_json(&data)?)
    }

    pub async fn store_coupon(&self, store_id: &str, coupon_id: &str, lang: &str) -> Result<Value> {
        self.request_json(&self.urls.coupon_url(store_id, coupon_id, lang))
            .await
    }

    /// Ask the API to validate the order; false when it reports failure
    pub async fn validate(&self, order: &mut Order) -> Result<bool> {
        let response = self.send_order(&self.urls.validate_url(), order, true).await?;
        Ok(status_ok(&response))
    }

    /// Price the order, merging amounts into it
    pub async fn price(&self, order: &mut Order) -> Result<Value> {
        let response = self.send_order(&self.urls.price_url(), order, true).await?;
        check_price(&response)?;
        Ok(response)
    }

    /// Price the order, then attach `payment`; nothing is placed
    pub async fn pay_with(&self, order: &mut Order, payment: &Payment) -> Result<Value> {
        let response = self.price(order).await?;
        order.apply_payment(payment)?;
        Ok(response)
    }

    /// Price, attach `payment` and place the order
    pub async fn place(&self, order: &mut Order, payment: &Payment) -> Result<Value> {
        self.pay_with(order, payment).await?;
        let response = self.send_order(&self.urls.place_url(), order, false).await?;
        info!("Order placed for {}", order.customer.first_name);
        Ok(response)
    }

    pub async fn track_by_phone(&self, phone: &str) -> Result<Vec<OrderStatus>> {
        let body = self
            .request_xml(&self.urls.track_by_phone_url(phone.trim()))
            .await?;
        Ok(parse_tracker_xml(&body)?)
    }

    pub async fn track_by_order(&self, store_id: &str, order_key: &str) -> Result<Value> {
        self.request_json(&self.urls.track_by_order_url(store_id, order_key))
            .await
    }
}

async fn ensure_success(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    debug!("{status} from {url}");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        }
        .into());
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pizza_core::country::Country;
    use pizza_core::customer::Customer;
    use pizza_core::payment::CreditCard;
    use serde_json::json;

    fn test_api(server: &mockito::ServerGuard) -> Api {
        let urls = Urls::new(Country::Us).with_hosts(Some(server.url()), Some(server.url()));
        Api::new(urls).unwrap()
    }

    fn customer() -> Customer {
        Customer::new(
            "Jane",
            "Doe",
            "jane@example.com",
            "5551234567",
            "1 Main St, Springfield, IL, 62701",
        )
        .unwrap()
    }

    fn menu_body() -> String {
        json!({
            "Variants": {
                "14SCREEN": { "Code": "14SCREEN", "Name": "Large Hand Tossed", "Price": "13.99" }
            },
            "Products": {
                "S_PIZZA": { "Code": "S_PIZZA", "Name": "Hand Tossed Pizza" }
            },
            "Coupons": {},
            "PreconfiguredProducts": {},
            "Categorization": {
                "Food": { "Code": "Food", "Name": "Food", "Categories": [], "Products": ["S_PIZZA"] }
            }
        })
        .to_string()
    }

    async fn order_with_item(api: &Api, server: &mut mockito::ServerGuard) -> Order {
        let menu_mock = server
            .mock("GET", "/power/store/4336/menu")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(menu_body())
            .create_async()
            .await;

        let menu = api.store_menu("4336", "en").await.unwrap();
        menu_mock.assert_async().await;

        let mut order = Order::new("4336", customer(), Country::Us);
        order.add_item(&menu, "14SCREEN", 1).unwrap();
        order
    }

    #[tokio::test]
    async fn test_nearby_stores_filters_closed_stores() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/power/store-locator")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("s".into(), "1 Main St".into()),
                Matcher::UrlEncoded("c".into(), "Springfield, IL, 62701".into()),
                Matcher::UrlEncoded("type".into(), "Delivery".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "Stores": [
                        { "StoreID": "1", "IsOnlineNow": false, "ServiceIsOpen": { "Delivery": true } },
                        { "StoreID": "2", "IsOnlineNow": true, "ServiceIsOpen": { "Delivery": true } }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let api = test_api(&server);
        let address: Address = "1 Main St, Springfield, IL, 62701".parse().unwrap();

        let stores = api
            .nearby_stores(&address, ServiceMethod::Delivery)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].id, "2");
    }

    #[tokio::test]
    async fn test_closest_store_none_open() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/power/store-locator")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "Stores": [] }).to_string())
            .create_async()
            .await;
        let api = test_api(&server);
        let address: Address = "1 Main St, Springfield".parse().unwrap();

        let err = api
            .closest_store(&address, ServiceMethod::Delivery)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No local stores"));
    }

    #[tokio::test]
    async fn test_request_json_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/power/store/9999/profile")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;
        let api = test_api(&server);

        let err = api.store_details("9999").await.unwrap_err();

        match err.downcast_ref::<Error>() {
            Some(Error::Http { status, body, .. }) => {
                assert_eq!(*status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_store_menu_parses_categories() {
        let mut server = mockito::Server::new_async().await;
        let api = test_api(&server);

        let order = order_with_item(&api, &mut server).await;

        assert_eq!(order.products().len(), 1);
    }

    #[tokio::test]
    async fn test_validate_merges_response() {
        let mut server = mockito::Server::new_async().await;
        let api = test_api(&server);
        let mut order = order_with_item(&api, &mut server).await;
        let mock = server
            .mock("POST", "/power/validate-order")
            .match_header("content-type", "application/json")
            .match_header("referer", "https://order.dominos.com/en/pages/order/")
            .match_body(Matcher::PartialJson(json!({
                "Order": { "StoreID": "4336", "FirstName": "Jane" }
            })))
            .with_status(200)
            .with_body(json!({ "Status": 0, "Order": { "OrderID": "abc" } }).to_string())
            .create_async()
            .await;

        let valid = api.validate(&mut order).await.unwrap();

        mock.assert_async().await;
        assert!(valid);
        assert_eq!(order.data["OrderID"], json!("abc"));
    }

    #[tokio::test]
    async fn test_validate_reports_failure_status() {
        let mut server = mockito::Server::new_async().await;
        let api = test_api(&server);
        let mut order = order_with_item(&api, &mut server).await;
        server
            .mock("POST", "/power/validate-order")
            .with_status(200)
            .with_body(json!({ "Status": -1, "Order": {} }).to_string())
            .create_async()
            .await;

        assert!(!api.validate(&mut order).await.unwrap());
    }

    #[tokio::test]
    async fn test_price_failure() {
        let mut server = mockito::Server::new_async().await;
        let api = test_api(&server);
        let mut order = order_with_item(&api, &mut server).await;
        server
            .mock("POST", "/power/price-order")
            .with_status(200)
            .with_body(json!({ "Status": -1, "Order": {} }).to_string())
            .create_async()
            .await;

        let err = api.price(&mut order).await.unwrap_err();

        assert!(err.to_string().contains("Get price failed"));
    }

    #[tokio::test]
    async fn test_send_order_without_products_does_not_post() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/power/price-order")
            .expect(0)
            .create_async()
            .await;
        let api = test_api(&server);
        let mut order = Order::new("4336", customer(), Country::Us);

        let err = api.price(&mut order).await.unwrap_err();

        mock.assert_async().await;
        assert!(err.to_string().contains("Products"));
    }

    #[tokio::test]
    async fn test_pay_with_card_uses_priced_amount() {
        let mut server = mockito::Server::new_async().await;
        let api = test_api(&server);
        let mut order = order_with_item(&api, &mut server).await;
        server
            .mock("POST", "/power/price-order")
            .with_status(200)
            .with_body(
                json!({ "Status": 1, "Order": { "Amounts": { "Customer": 15.27 }, "Products": [] } })
                    .to_string(),
            )
            .create_async()
            .await;
        let card = CreditCard::new("4111111111111111", "0128", "123", "62701");

        api.pay_with(&mut order, &Payment::CreditCard(card))
            .await
            .unwrap();

        assert_eq!(order.products().len(), 1);
        assert_eq!(order.payments()[0]["Amount"], json!(15.27));
        assert_eq!(order.payments()[0]["Type"], json!("CreditCard"));
    }

    #[tokio::test]
    async fn test_place_prices_then_places() {
        let mut server = mockito::Server::new_async().await;
        let api = test_api(&server);
        let mut order = order_with_item(&api, &mut server).await;
        let price = server
            .mock("POST", "/power/price-order")
            .with_status(200)
            .with_body(json!({ "Status": 1, "Order": { "Amounts": { "Customer": 9.5 } } }).to_string())
            .create_async()
            .await;
        let place = server
            .mock("POST", "/power/place-order")
            .match_body(Matcher::PartialJson(json!({
                "Order": { "Payments": [{ "Type": "Cash" }] }
            })))
            .with_status(200)
            .with_body(json!({ "Status": 1, "Order": { "OrderID": "placed" } }).to_string())
            .create_async()
            .await;

        let response = api.place(&mut order, &Payment::Cash).await.unwrap();

        price.assert_async().await;
        place.assert_async().await;
        assert_eq!(response["Order"]["OrderID"], json!("placed"));
        // place-order responses are not merged
        assert_ne!(order.data["OrderID"], json!("placed"));
    }

    #[tokio::test]
    async fn test_track_by_phone() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orderstorage/GetTrackerData")
            .match_query(Matcher::UrlEncoded("Phone".into(), "5551234567".into()))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(
                r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetTrackerDataResponse>
      <OrderStatuses>
        <OrderStatus><OrderID>abc</OrderID><OrderStatus>Oven</OrderStatus></OrderStatus>
      </OrderStatuses>
    </GetTrackerDataResponse>
  </soap:Body>
</soap:Envelope>"#,
            )
            .create_async()
            .await;
        let api = test_api(&server);

        let statuses = api.track_by_phone(" 5551234567 ").await.unwrap();

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0]["OrderStatus"], json!("Oven"));
    }

    #[tokio::test]
    async fn test_track_by_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/orderstorage/GetTrackerData")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("StoreID".into(), "4336".into()),
                Matcher::UrlEncoded("OrderKey".into(), "key1".into()),
            ]))
            .with_status(200)
            .with_body(json!([{ "OrderStatus": "Complete" }]).to_string())
            .create_async()
            .await;
        let api = test_api(&server);

        let data = api.track_by_order("4336", "key1").await.unwrap();

        assert_eq!(data[0]["OrderStatus"], json!("Complete"));
    }
}
