//! Adapters against local mock backends.

use httpmock::prelude::*;
use serde_json::{Value, json};
use zurich_core::adapters::{
    Adapter, CatalogAdapter, CatalogRequest, FeatureRequest, GeoAdapter, JsonAdapter,
    JsonRequest, QueryParams, RecordsAdapter, RecordsQuery, SparqlAdapter, SparqlQuery, execute,
    hit_count, hits,
};
use zurich_core::{BackendError, Endpoints};
use zurich_model::registry::namespaces;
use zurich_model::{PackageSearch, ParkingFeed};

const RECORDS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<SearchDetailResponse xmlns="http://www.cmiag.ch/cdws/searchDetailResponse" numHits="42">
  <Hit><Geschaeft xmlns="http://www.cmiag.ch/cdws/Geschaeft"><GRNr>2024/1</GRNr></Geschaeft></Hit>
  <Hit><Geschaeft xmlns="http://www.cmiag.ch/cdws/Geschaeft"><GRNr>2024/2</GRNr></Geschaeft></Hit>
  <Hit><Geschaeft xmlns="http://www.cmiag.ch/cdws/Geschaeft"><GRNr>2024/3</GRNr></Geschaeft></Hit>
</SearchDetailResponse>"#;

#[tokio::test]
async fn catalog_search_returns_result_payload() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/3/action/package_search")
            .query_param("q", "Schule")
            .query_param("rows", "3");
        then.status(200).json_body(json!({
            "success": true,
            "result": {
                "count": 120,
                "results": [{"name": "a"}, {"name": "b"}, {"name": "c"}]
            }
        }));
    });

    let endpoints = Endpoints::under(&server.base_url());
    let adapter = CatalogAdapter::new(endpoints.catalog);
    let params = QueryParams::new().with("q", "Schule").with("rows", 3);
    let search: PackageSearch = adapter
        .action("package_search", &params)
        .await
        .expect("search");

    assert_eq!(search.count, 120);
    assert_eq!(search.results.len(), 3);
    mock.assert_calls(1);
}

#[tokio::test]
async fn failed_envelope_is_protocol_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/3/action/package_show");
        then.status(200).json_body(json!({
            "success": false,
            "error": {"message": "Not found: dataset", "__type": "Not Found Error"}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/3/action/tag_list");
        then.status(200).json_body(json!({"success": false}));
    });

    let adapter = CatalogAdapter::new(Endpoints::under(&server.base_url()).catalog);
    let err = adapter
        .action::<Value>("package_show", &QueryParams::new().with("id", "x"))
        .await
        .expect_err("failure envelope");
    assert_eq!(err, BackendError::Protocol("Not found: dataset".to_string()));

    let err = adapter
        .action::<Value>("tag_list", &QueryParams::new())
        .await
        .expect_err("failure envelope");
    assert_eq!(err, BackendError::Protocol("Unknown error".to_string()));
}

#[tokio::test]
async fn missing_dataset_is_classified_through_execute() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/3/action/package_show");
        then.status(404).body("not found");
    });

    let adapter = CatalogAdapter::new(Endpoints::under(&server.base_url()).catalog);
    let request = CatalogRequest::new("package_show", QueryParams::new().with("id", "nope"));
    let message = execute(&adapter, request, "Datensatz-Details")
        .await
        .expect_err("404");
    assert_eq!(
        message,
        "Fehler bei Datensatz-Details: Ressource nicht gefunden. Bitte ID/Name prüfen."
    );

    let request = CatalogRequest::new("package_show", QueryParams::new().with("id", "nope"));
    let err = adapter.fetch(request).await.expect_err("404");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn wfs_features_are_returned_untruncated() {
    let server = MockServer::start();
    let features: Vec<Value> = (0..5)
        .map(|i| {
            json!({
                "type": "Feature",
                "id": i,
                "geometry": {"type": "Point", "coordinates": [8.54, 47.37]},
                "properties": {"name": format!("Kindergarten {i}")}
            })
        })
        .collect();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/wfs/geoportal/Schulanlagen")
            .query_param("service", "WFS")
            .query_param("version", "1.1.0")
            .query_param("request", "GetFeature")
            .query_param("typename", "poi_kindergarten_view")
            .query_param("outputFormat", "GeoJSON")
            .query_param("maxFeatures", "5")
            .query_param("CQL_FILTER", "name LIKE '%Wiedikon%'");
        then.status(200).json_body(json!({
            "type": "FeatureCollection",
            "totalFeatures": 5,
            "features": features
        }));
    });

    let adapter = GeoAdapter::new(Endpoints::under(&server.base_url()).geodata);
    let request = FeatureRequest::new("Schulanlagen", "poi_kindergarten_view")
        .with_max_features(5)
        .with_filter(Some("name LIKE '%Wiedikon%'".to_string()));
    let collection = adapter.fetch(request).await.expect("features");

    assert_eq!(collection.features.len(), 5);
    assert_eq!(collection.extra.get("totalFeatures"), Some(&json!(5)));
    assert_eq!(collection.features[0].point(), Some((8.54, 47.37)));
    mock.assert_calls(1);
}

#[tokio::test]
async fn records_search_parses_hits() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/geschaeft/searchdetails")
            .query_param("q", r#"Titel any "Schule""#)
            .query_param("l", "de-CH")
            .query_param("s", "1")
            .query_param("m", "3");
        then.status(200)
            .header("content-type", "application/xml")
            .body(RECORDS_XML);
    });

    let adapter = RecordsAdapter::new(Endpoints::under(&server.base_url()).records);
    let query = RecordsQuery::new("geschaeft", r#"Titel any "Schule""#).with_max_results(3);
    let root = adapter.search(&query).await.expect("records");

    assert_eq!(hit_count(&root), 42);
    assert_eq!(hits(&root).count(), 3);
    assert!(root.is(namespaces::SEARCH, "SearchDetailResponse"));
    mock.assert_calls(1);
}

#[tokio::test]
async fn malformed_records_body_is_xml_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/kontakt/searchdetails");
        then.status(200).body("<SearchDetailResponse><Hit>");
    });

    let adapter = RecordsAdapter::new(Endpoints::under(&server.base_url()).records);
    let err = adapter
        .search(&RecordsQuery::new("kontakt", "x"))
        .await
        .expect_err("malformed");
    assert!(matches!(err, BackendError::XmlParse(_)));
    assert_eq!(err.kind_name(), "XmlParseError");
}

#[tokio::test]
async fn sparql_without_bindings_is_empty_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/query")
            .query_param("query", "SELECT ?s WHERE { ?s ?p ?o } LIMIT 0")
            .header("accept", "application/json");
        then.status(200).json_body(json!({
            "head": {"vars": ["s"]},
            "results": {"bindings": []}
        }));
    });

    let adapter = SparqlAdapter::new(Endpoints::under(&server.base_url()).sparql);
    let result = adapter
        .fetch(SparqlQuery("SELECT ?s WHERE { ?s ?p ?o } LIMIT 0".to_string()))
        .await
        .expect("sparql");
    assert!(result.is_empty());
    assert_eq!(result.variables(), ["s"]);
    mock.assert_calls(1);
}

#[tokio::test]
async fn json_adapter_decodes_parking_feed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Zuerich");
        then.status(200).json_body(json!({
            "last_updated": "2026-03-01T10:00:00",
            "lots": [
                {"name": "Parkhaus Jelmoli", "free": 50, "total": 200, "state": "open"},
                {"name": "Parkhaus Urania", "free": 0, "total": 0, "state": "nodata"}
            ]
        }));
    });

    let endpoints = Endpoints::under(&server.base_url());
    let feed: ParkingFeed = JsonAdapter
        .get(&endpoints.parking, &QueryParams::new())
        .await
        .expect("feed");
    assert_eq!(feed.lots.len(), 2);
    assert_eq!(feed.lots[0].occupancy_percent(), 75);
    assert_eq!(feed.lots[1].occupancy_percent(), 0);

    let raw = JsonAdapter
        .fetch(JsonRequest::new(endpoints.parking))
        .await
        .expect("raw");
    assert_eq!(raw["lots"][0]["name"], "Parkhaus Jelmoli");
}

#[tokio::test]
async fn parking_lots_without_counts_still_decode() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Zuerich");
        then.status(200).json_body(json!({
            "lots": [
                {"name": "Parkhaus Hohe Promenade", "free": null, "total": null, "state": "nodata"},
                {"name": "Parkhaus Opera", "free": 120, "total": 299, "state": "open"}
            ]
        }));
    });

    let endpoints = Endpoints::under(&server.base_url());
    let feed: ParkingFeed = JsonAdapter
        .get(&endpoints.parking, &QueryParams::new())
        .await
        .expect("feed");
    assert_eq!(feed.lots.len(), 2);
    assert_eq!((feed.lots[0].free, feed.lots[0].total), (0, 0));
    assert_eq!(feed.lots[0].occupancy_percent(), 0);
    assert_eq!(feed.lots[1].free, 120);
    assert!(feed.lots[1].is_open());
}

#[tokio::test]
async fn server_errors_keep_status_and_url() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Zuerich");
        then.status(503);
    });

    let endpoints = Endpoints::under(&server.base_url());
    let err = JsonAdapter
        .get::<Value>(&endpoints.parking, &QueryParams::new())
        .await
        .expect_err("503");
    match err {
        BackendError::Status { status, url } => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/Zuerich"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
