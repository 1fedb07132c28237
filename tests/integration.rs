//! End-to-end tests for the basirah client.
//!
//! These drive the public API from on-disk reference data through the view
//! controller and backend client, with a mock transport standing in for
//! the network.

use std::path::Path;

use serde_json::json;

use basirah::catalog::{Author, Language, TextDirection, TextStyle};
use basirah::client::{
    AuthPolicy, ClientError, HttpResponse, MockTransport, SearchEndpoint, TafsirClient,
    TafsirQuery,
};
use basirah::config::BasirahConfig;
use basirah::reference::{DEFAULT_MAX_AYAH, ReferenceData};
use basirah::render::{Block, OutputSink, VecSink};
use basirah::session::{Session, SessionState};
use basirah::view::{Submission, ViewController, ViewMode};

const SURAHS: &str = r#"{"surahs": [
    {"surah_number": 1, "surah_name": "Al-Fatihah", "total_ayat": 7},
    {"surah_number": 2, "surah_name": "Al-Baqarah", "total_ayat": 286},
    {"surah_number": 112, "surah_name": "Al-Ikhlas", "total_ayat": 4}
]}"#;

const VERSES: &str = r#"{
    "1": {"1": {"arabic": "بِسْمِ ٱللَّهِ"}, "2": {"arabic": "ٱلْحَمْدُ لِلَّهِ"}},
    "2": {"255": {"arabic": "ٱللَّهُ لَآ إِلَٰهَ إِلَّا هُوَ"}},
    "112": {"1": {"arabic": "قُلْ هُوَ ٱللَّهُ أَحَدٌ"}}
}"#;

fn write_dataset(dir: &Path) {
    std::fs::write(dir.join("surah.json"), SURAHS).unwrap();
    std::fs::write(dir.join("quran.json"), VERSES).unwrap();
}

fn reference(dir: &tempfile::TempDir) -> ReferenceData {
    write_dataset(dir.path());
    ReferenceData::load(dir.path()).unwrap()
}

fn client(auth: AuthPolicy) -> TafsirClient<MockTransport> {
    TafsirClient::new("http://backend.test/", MockTransport::new()).with_auth_policy(auth)
}

#[test]
fn tafsir_end_to_end_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let reference = reference(&dir);
    let client = client(AuthPolicy::Optional);
    client
        .transport()
        .push_json(200, json!({"tafsir_text": "قوله تعالى\nسطر ثان"}));

    let mut controller = ViewController::new(&reference, Language::Arabic, 3);
    controller.tafsir.author = Author::Tabari;
    controller.tafsir.select_surah(&reference, 2).unwrap();
    controller.tafsir.select_ayah(&reference, 255).unwrap();

    let blocks = controller
        .submit(&client, &Session::new(), &reference)
        .into_blocks();

    let req = client.transport().last_request().unwrap();
    assert_eq!(req.url(), "http://backend.test/tafsir/tabari/2/255");
    assert_eq!(req.query_value("lang"), Some("ar"));
    assert_eq!(req.header("authorization"), None);

    assert_eq!(blocks[0], Block::verse("2:255 ٱللَّهُ لَآ إِلَٰهَ إِلَّا هُوَ"));
    assert_eq!(blocks[1].direction(), TextDirection::Rtl);
}

#[test]
fn tafsir_path_keeps_author_surah_ayah_order() {
    let client = client(AuthPolicy::Optional);
    for author in Author::ALL {
        for lang in Language::ALL {
            client
                .transport()
                .push_json(200, json!({"tafsir_text": "t"}));
            let query = TafsirQuery {
                author,
                surah: 3,
                ayah: 7,
                language: lang,
            };
            client.fetch_tafsir(None, &query).unwrap();
            let req = client.transport().last_request().unwrap();
            assert_eq!(req.path, format!("/tafsir/{}/3/7", author.slug()));
            assert_eq!(req.query_value("lang"), Some(lang.code()));
        }
    }
}

#[test]
fn reflection_sends_exactly_five_params() {
    let dir = tempfile::TempDir::new().unwrap();
    let reference = reference(&dir);
    let client = client(AuthPolicy::Optional);
    client
        .transport()
        .push_json(200, json!({"reflection": "A reflection."}));

    let mut controller = ViewController::new(&reference, Language::English, 3);
    controller.set_mode(ViewMode::Reflection);
    controller.reflection.author = Author::IbnKatheer;
    controller.reflection.select_surah(&reference, 1).unwrap();
    controller.reflection.select_from(&reference, 1).unwrap();
    controller.reflection.select_to(&reference, 2).unwrap();

    let blocks = controller
        .submit(&client, &Session::new(), &reference)
        .into_blocks();

    let req = client.transport().last_request().unwrap();
    let mut keys = req.query_keys();
    keys.sort_unstable();
    assert_eq!(keys, ["author", "from_ayah", "lang", "surah", "to_ayah"]);
    assert_eq!(req.query_value("author"), Some("ibn-katheer"));
    assert_eq!(req.query_value("from_ayah"), Some("1"));
    assert_eq!(req.query_value("to_ayah"), Some("2"));

    assert_eq!(blocks[0], Block::verse("1:1 بِسْمِ ٱللَّهِ"));
    assert_eq!(blocks[1], Block::verse("1:2 ٱلْحَمْدُ لِلَّهِ"));
    assert_eq!(
        blocks[2],
        Block::heading("Reflection for Surah 1: Ayah 1 - 2")
    );
    assert_eq!(blocks[3], Block::body("A reflection.", TextStyle::Latin));
}

#[test]
fn to_ayah_choices_start_at_from_ayah() {
    let dir = tempfile::TempDir::new().unwrap();
    let reference = reference(&dir);
    let mut controller = ViewController::new(&reference, Language::English, 3);
    let form = &mut controller.reflection;
    form.select_surah(&reference, 112).unwrap();
    for from in 1..=4 {
        form.select_from(&reference, from).unwrap();
        assert_eq!(form.to_choices(&reference), from..=4);
        assert!(form.to_ayah() >= from);
    }
    assert!(form.select_to(&reference, 3).is_err());
}

#[test]
fn search_filters_are_optional_params() {
    let dir = tempfile::TempDir::new().unwrap();
    let reference = reference(&dir);
    let client = client(AuthPolicy::Optional).with_search_endpoint(SearchEndpoint::Search);
    let session = Session::new();
    let mut controller = ViewController::new(&reference, Language::Arabic, 5);
    controller.set_mode(ViewMode::TopicSearch);
    controller.topic.query = "mercy".into();

    client.transport().push_json(200, json!({"results": []}));
    let out = controller.submit(&client, &session, &reference);
    assert_eq!(out, Submission::Rendered(vec![Block::notice("No results.")]));
    let req = client.transport().last_request().unwrap();
    assert_eq!(req.path, "/search");
    let mut keys = req.query_keys();
    keys.sort_unstable();
    assert_eq!(keys, ["lang", "q", "top_k"]);

    controller.topic.author = Some(Author::Tabari);
    controller.topic.select_surah(&reference, Some(2)).unwrap();
    client.transport().push_json(200, json!({"results": []}));
    controller.submit(&client, &session, &reference);
    let req = client.transport().last_request().unwrap();
    assert_eq!(req.query_value("author"), Some("tabari"));
    assert_eq!(req.query_value("surah"), Some("2"));
    assert_eq!(req.query_value("top_k"), Some("5"));
}

#[test]
fn search_results_render_with_local_names() {
    let dir = tempfile::TempDir::new().unwrap();
    let reference = reference(&dir);
    let client = client(AuthPolicy::Optional);
    client.transport().push_json(
        200,
        json!({"results": [
            {"surah": "112", "ayah_range": ["1", "1"], "score": 0.91234,
             "author": "qurtubi", "text": "نص", "translated_text": "text"},
            {"surah": 9, "ayah_range": [5, 6], "score": 0.5,
             "author": "tabari", "text": "نص", "translated_text": "other",
             "surah_name_english": "At-Tawbah"}
        ]}),
    );
    let mut controller = ViewController::new(&reference, Language::English, 3);
    controller.set_mode(ViewMode::TopicSearch);
    controller.topic.query = "oneness".into();

    let sink = VecSink::new();
    sink.emit_all(
        &controller
            .submit(&client, &Session::new(), &reference)
            .into_blocks(),
    );
    let blocks = sink.blocks();
    assert!(blocks.contains(&Block::heading(
        "Surah 112 (Al-Ikhlas) - Ayah 1 | Score: 0.912"
    )));
    assert!(blocks.contains(&Block::heading(
        "Surah 9 (At-Tawbah) - Ayah 5 | Score: 0.5"
    )));
    assert!(blocks.contains(&Block::verse("not found")));
    assert!(blocks.contains(&Block::body("other", TextStyle::Latin)));
    assert!(blocks.contains(&Block::Separator));
}

#[test]
fn blank_search_makes_no_request() {
    let client = client(AuthPolicy::Optional);
    let reference = ReferenceData::default();
    let mut controller = ViewController::new(&reference, Language::Arabic, 3);
    controller.set_mode(ViewMode::TopicSearch);
    controller.topic.query = "   ".into();
    let out = controller.submit(&client, &Session::new(), &reference);
    assert_eq!(out, Submission::Skipped);
    assert!(client.transport().requests().is_empty());
}

#[test]
fn non_success_status_shows_body_verbatim() {
    let reference = ReferenceData::default();
    let client = client(AuthPolicy::Optional);
    let controller = ViewController::new(&reference, Language::Arabic, 3);
    for (status, body) in [
        (404, r#"{"detail":"Not Found"}"#),
        (500, "Internal Server Error"),
        (302, ""),
    ] {
        client
            .transport()
            .push_response(HttpResponse::new(status, body));
        let out = controller.submit(&client, &Session::new(), &reference);
        assert_eq!(out, Submission::Error(body.to_string()));
    }
}

#[test]
fn login_logout_round_trip_with_required_auth() {
    let dir = tempfile::TempDir::new().unwrap();
    let reference = reference(&dir);
    let client = client(AuthPolicy::Required);
    let controller = ViewController::new(&reference, Language::Arabic, 3);
    let mut session = Session::new();

    client
        .transport()
        .push_response(HttpResponse::new(401, r#"{"detail":"bad"}"#));
    assert!(!session.login(&client, "u", "bad"));
    assert_eq!(session.state(), SessionState::Anonymous);

    client
        .transport()
        .push_json(200, json!({"access_token": "tok-1", "token_type": "bearer"}));
    assert!(session.login(&client, "u", "good"));
    assert_eq!(session.current_token(), Some("tok-1"));

    client
        .transport()
        .push_json(200, json!({"tafsir_text": "t"}));
    controller.submit(&client, &session, &reference);
    let req = client.transport().last_request().unwrap();
    assert_eq!(req.header("Authorization"), Some("Bearer tok-1"));

    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
    let sent = client.transport().requests().len();
    let err = client
        .fetch_tafsir(
            session.current_token(),
            &TafsirQuery {
                author: Author::Tabari,
                surah: 1,
                ayah: 1,
                language: Language::Arabic,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
    assert_eq!(client.transport().requests().len(), sent);
}

#[test]
fn missing_surah_falls_back_to_default_max() {
    let dir = tempfile::TempDir::new().unwrap();
    let reference = reference(&dir);
    assert_eq!(reference.max_ayah(50), DEFAULT_MAX_AYAH);
    assert_eq!(reference.max_ayah(50), 286);
    assert_eq!(reference.max_ayah(112), 4);
}

#[test]
fn language_style_mapping_is_total() {
    for lang in Language::ALL {
        let expected = match lang {
            Language::Arabic | Language::Urdu => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        };
        assert_eq!(lang.direction(), expected, "{lang:?}");
    }
}

#[test]
fn config_file_drives_client() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "base_url = \"http://localhost:8000/\"\nsearch_endpoint = \"search\"\nrequire_auth = true\n",
    )
    .unwrap();
    let config = BasirahConfig::load(&path).unwrap();
    let client = TafsirClient::from_config(&config);
    assert_eq!(client.base_url(), "http://localhost:8000");
    assert_eq!(client.auth_policy(), AuthPolicy::Required);
}
