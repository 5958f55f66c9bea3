mod common;

use common::{init_test_tracing, ControlledClient, FixedClient, CATS_BODY};
use ddg_typeahead::typeahead::{ErrorPolicy, SuggestionUpdate, TextChanged};
use ddg_typeahead::{
    HttpApiClient, QueryBuilder, QueryFlags, SearchService, Suggestion, TypeaheadConfig,
    TypeaheadPipeline,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WINDOW: Duration = Duration::from_millis(500);

fn stub_pipeline<C>(client: Arc<C>, config: TypeaheadConfig) -> TypeaheadPipeline
where
    C: ddg_typeahead::ApiClient + 'static,
{
    TypeaheadPipeline::new(SearchService::new(QueryFlags::default(), client), config)
}

#[tokio::test]
async fn test_typing_against_mock_server_delivers_leaf_topics() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "cats"))
        .and(query_param("format", "json"))
        .and(query_param("no_redirect", "0"))
        .and(query_param("no_html", "0"))
        .and(query_param("skip_disambig", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATS_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let service = SearchService::new(
        QueryFlags::default().secure(false),
        HttpApiClient::new().unwrap(),
    )
    .with_builder(QueryBuilder::with_endpoint(format!("{}/", server.uri())));
    let config = TypeaheadConfig::default().debounce_window(Duration::from_millis(20));
    let mut session = TypeaheadPipeline::new(service, config).start();

    for text in ["c", "ca", "cat", "cats"] {
        assert!(session.user_input(text));
    }
    session.finish_input();

    let mut updates = Vec::new();
    session
        .deliver_to(&mut |u: SuggestionUpdate| updates.push(u))
        .await;

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].query, "cats");
    assert_eq!(
        updates[0].suggestions,
        vec![Suggestion {
            text: "Cats (disambiguation)".to_string(),
            uri: "http://duckduckgo.com/Cats_(disambiguation)".to_string(),
        }]
    );
    assert_eq!(session.metrics().snapshot().issued, 1);
}

#[tokio::test]
async fn test_server_error_is_not_delivered() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = SearchService::new(
        QueryFlags::default().secure(false),
        HttpApiClient::new().unwrap(),
    )
    .with_builder(QueryBuilder::with_endpoint(format!("{}/", server.uri())));
    let config = TypeaheadConfig::default().debounce_window(Duration::from_millis(20));
    let mut session = TypeaheadPipeline::new(service, config).start();

    session.user_input("cats");
    session.finish_input();

    assert!(session.next_update().await.is_none());
    let snapshot = session.metrics().snapshot();
    assert_eq!(snapshot.transport_errors, 1);
    assert_eq!(snapshot.delivered, 0);
}

#[tokio::test(start_paused = true)]
async fn test_only_latest_query_reaches_the_sink() {
    init_test_tracing();
    let client = Arc::new(ControlledClient::default());
    let config = TypeaheadConfig::default()
        .debounce_window(WINDOW)
        .abort_superseded(false);
    let mut session = stub_pipeline(client.clone(), config).start();

    for term in ["rust", "rust lang", "rust book"] {
        session.user_input(term);
        sleep(WINDOW * 2).await;
        assert!(client.is_waiting(term));
    }
    assert_eq!(client.issued(), ["rust", "rust lang", "rust book"]);

    // answer in reverse issue order
    assert!(client.complete("rust book"));
    assert!(client.complete("rust lang"));
    assert!(client.complete("rust"));
    session.finish_input();

    let mut updates = Vec::new();
    session
        .deliver_to(&mut |u: SuggestionUpdate| updates.push(u))
        .await;

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].query, "rust book");
    assert_eq!(updates[0].suggestions[0].text, "rust book (topic)");

    let snapshot = session.metrics().snapshot();
    assert_eq!(snapshot.issued, 3);
    assert_eq!(snapshot.superseded, 2);
    assert_eq!(snapshot.delivered, 1);
}

#[tokio::test(start_paused = true)]
async fn test_aborted_query_never_completes() {
    let client = Arc::new(ControlledClient::default());
    let config = TypeaheadConfig::default().debounce_window(WINDOW);
    let mut session = stub_pipeline(client.clone(), config).start();

    session.user_input("cat");
    sleep(WINDOW * 2).await;
    assert!(client.is_waiting("cat"));

    session.user_input("cats");
    sleep(Duration::from_millis(1)).await;
    assert!(!client.complete("cat"));

    sleep(WINDOW * 2).await;
    assert!(client.complete("cats"));

    let update = session.next_update().await.unwrap();
    assert_eq!(update.query, "cats");
    session.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_failure_after_success_keeps_list_unless_clearing() {
    for (policy, expected) in [(ErrorPolicy::KeepPrevious, 1), (ErrorPolicy::Clear, 2)] {
        let client = Arc::new(ControlledClient::default());
        let config = TypeaheadConfig::default()
            .debounce_window(WINDOW)
            .on_error(policy);
        let mut session = stub_pipeline(client.clone(), config).start();

        session.user_input("cat");
        sleep(WINDOW * 2).await;
        assert!(client.complete("cat"));
        let first = session.next_update().await.unwrap();
        assert_eq!(first.suggestions.len(), 1);

        session.user_input("catz");
        sleep(WINDOW * 2).await;
        assert!(client.fail("catz", 500));
        session.finish_input();

        let mut rest = Vec::new();
        session
            .deliver_to(&mut |u: SuggestionUpdate| rest.push(u))
            .await;

        assert_eq!(1 + rest.len(), expected, "policy {:?}", policy);
        if let Some(cleared) = rest.first() {
            assert_eq!(cleared.query, "catz");
            assert!(cleared.suggestions.is_empty());
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_selecting_a_suggestion_does_not_requery() {
    let client = Arc::new(FixedClient::new(CATS_BODY));
    let config = TypeaheadConfig::default().debounce_window(WINDOW);
    let mut session = stub_pipeline(client.clone(), config).start();

    session.user_input("cats");
    sleep(WINDOW * 2).await;
    let update = session.next_update().await.unwrap();

    // the UI writes the chosen suggestion back into the field
    let chosen = update.suggestions[0].text.clone();
    session.text_changed(TextChanged::programmatic(chosen));
    sleep(WINDOW * 2).await;

    session.finish_input();
    assert!(session.next_update().await.is_none());
    assert_eq!(client.uris().len(), 1);
    assert!(client.uris()[0].starts_with("https://api.duckduckgo.com/?q=cats&t="));
}
