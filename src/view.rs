//! View controller: the three feature modes, their bounded-choice forms, and
//! the mapping from a submitted form to a backend call and rendered blocks.
//!
//! Nothing here touches the terminal; the TUI and the CLI both drive these
//! types and draw the resulting [`Block`]s.

use std::ops::RangeInclusive;

use crate::catalog::{Author, Language};
use crate::client::{
    ReflectionQuery, ReflectionResponse, SearchResponse, TafsirClient, TafsirQuery,
    TafsirResponse, TopicQuery, Transport,
};
use crate::config::TOP_K_RANGE;
use crate::error::{ViewError, ViewResult};
use crate::reference::ReferenceData;
use crate::render::Block;
use crate::session::Session;

/// Which feature the user is working in. Persists until changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Tafsir,
    Reflection,
    TopicSearch,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Tafsir, ViewMode::Reflection, ViewMode::TopicSearch];

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Tafsir => "View Tafsir",
            ViewMode::Reflection => "Reflection",
            ViewMode::TopicSearch => "Topic Search",
        }
    }

    /// The following mode, wrapping around.
    pub fn next(self) -> Self {
        match self {
            ViewMode::Tafsir => ViewMode::Reflection,
            ViewMode::Reflection => ViewMode::TopicSearch,
            ViewMode::TopicSearch => ViewMode::Tafsir,
        }
    }
}

/// Outcome of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Nothing was sent (topic search with an empty query).
    Skipped,
    /// The request failed; the message is shown verbatim and nothing else.
    Error(String),
    Rendered(Vec<Block>),
}

impl Submission {
    /// Blocks to draw for this outcome.
    pub fn into_blocks(self) -> Vec<Block> {
        match self {
            Submission::Skipped => Vec::new(),
            Submission::Error(message) => vec![Block::error(message)],
            Submission::Rendered(blocks) => blocks,
        }
    }
}

fn first_surah(reference: &ReferenceData) -> u16 {
    reference
        .surahs()
        .entries()
        .first()
        .map_or(1, |e| e.surah_number)
}

fn check_ayah(reference: &ReferenceData, surah: u16, ayah: u16) -> ViewResult<()> {
    let max = reference.max_ayah(surah);
    if (1..=max).contains(&ayah) {
        Ok(())
    } else {
        Err(ViewError::AyahOutOfRange { surah, ayah, max })
    }
}

fn check_surah(reference: &ReferenceData, surah: u16) -> ViewResult<()> {
    if reference.surahs().is_empty() || reference.surahs().get(surah).is_some() {
        Ok(())
    } else {
        Err(ViewError::UnknownSurah { surah })
    }
}

// ---------------------------------------------------------------------------
// Tafsir
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TafsirForm {
    surah: u16,
    ayah: u16,
    pub author: Author,
    pub language: Language,
}

impl TafsirForm {
    pub fn new(reference: &ReferenceData, language: Language) -> Self {
        Self {
            surah: first_surah(reference),
            ayah: 1,
            author: Author::ALL[0],
            language,
        }
    }

    pub fn surah(&self) -> u16 {
        self.surah
    }

    pub fn ayah(&self) -> u16 {
        self.ayah
    }

    /// Selectable ayat for the current surah.
    pub fn ayah_choices(&self, reference: &ReferenceData) -> RangeInclusive<u16> {
        1..=reference.max_ayah(self.surah)
    }

    /// Change surah; the ayah is kept when still valid, otherwise reset to 1.
    pub fn select_surah(&mut self, reference: &ReferenceData, surah: u16) -> ViewResult<()> {
        check_surah(reference, surah)?;
        self.surah = surah;
        if !self.ayah_choices(reference).contains(&self.ayah) {
            self.ayah = 1;
        }
        Ok(())
    }

    pub fn select_ayah(&mut self, reference: &ReferenceData, ayah: u16) -> ViewResult<()> {
        check_ayah(reference, self.surah, ayah)?;
        self.ayah = ayah;
        Ok(())
    }

    pub fn query(&self) -> TafsirQuery {
        TafsirQuery {
            author: self.author,
            surah: self.surah,
            ayah: self.ayah,
            language: self.language,
        }
    }
}

// ---------------------------------------------------------------------------
// Reflection
// ---------------------------------------------------------------------------

/// Reflection over a verse range. `from_ayah <= to_ayah` holds at all
/// times: the to-ayah choices always start at the chosen from-ayah.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionForm {
    surah: u16,
    from_ayah: u16,
    to_ayah: u16,
    pub author: Author,
    pub language: Language,
}

impl ReflectionForm {
    pub fn new(reference: &ReferenceData, language: Language) -> Self {
        Self {
            surah: first_surah(reference),
            from_ayah: 1,
            to_ayah: 1,
            author: Author::ALL[0],
            language,
        }
    }

    pub fn surah(&self) -> u16 {
        self.surah
    }

    pub fn from_ayah(&self) -> u16 {
        self.from_ayah
    }

    pub fn to_ayah(&self) -> u16 {
        self.to_ayah
    }

    pub fn from_choices(&self, reference: &ReferenceData) -> RangeInclusive<u16> {
        1..=reference.max_ayah(self.surah)
    }

    /// Exactly `[from_ayah, max_ayah]`.
    pub fn to_choices(&self, reference: &ReferenceData) -> RangeInclusive<u16> {
        self.from_ayah..=reference.max_ayah(self.surah)
    }

    pub fn select_surah(&mut self, reference: &ReferenceData, surah: u16) -> ViewResult<()> {
        check_surah(reference, surah)?;
        self.surah = surah;
        if !self.from_choices(reference).contains(&self.from_ayah) {
            self.from_ayah = 1;
        }
        if !self.to_choices(reference).contains(&self.to_ayah) {
            self.to_ayah = self.from_ayah;
        }
        Ok(())
    }

    /// Choose the start of the range; a to-ayah below it is pulled up.
    pub fn select_from(&mut self, reference: &ReferenceData, from: u16) -> ViewResult<()> {
        check_ayah(reference, self.surah, from)?;
        self.from_ayah = from;
        if self.to_ayah < from {
            self.to_ayah = from;
        }
        Ok(())
    }

    pub fn select_to(&mut self, reference: &ReferenceData, to: u16) -> ViewResult<()> {
        if to < self.from_ayah {
            return Err(ViewError::InvertedRange {
                from: self.from_ayah,
                to,
            });
        }
        check_ayah(reference, self.surah, to)?;
        self.to_ayah = to;
        Ok(())
    }

    pub fn query(&self) -> ReflectionQuery {
        ReflectionQuery {
            author: self.author,
            surah: self.surah,
            from_ayah: self.from_ayah,
            to_ayah: self.to_ayah,
            language: self.language,
        }
    }
}

// ---------------------------------------------------------------------------
// Topic search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicForm {
    pub query: String,
    /// `None` means "All Authors".
    pub author: Option<Author>,
    surah: Option<u16>,
    pub language: Language,
    top_k: u8,
}

impl TopicForm {
    pub fn new(language: Language, top_k: u8) -> Self {
        Self {
            query: String::new(),
            author: None,
            surah: None,
            language,
            top_k: top_k.clamp(*TOP_K_RANGE.start(), *TOP_K_RANGE.end()),
        }
    }

    /// `None` means "All Surahs".
    pub fn surah(&self) -> Option<u16> {
        self.surah
    }

    pub fn top_k(&self) -> u8 {
        self.top_k
    }

    /// Set the surah filter. `Some(0)` is the "All Surahs" sentinel.
    pub fn select_surah(&mut self, reference: &ReferenceData, surah: Option<u16>) -> ViewResult<()> {
        match surah.filter(|&s| s > 0) {
            Some(s) => {
                check_surah(reference, s)?;
                self.surah = Some(s);
            }
            None => self.surah = None,
        }
        Ok(())
    }

    pub fn select_top_k(&mut self, top_k: u8) -> ViewResult<()> {
        if !TOP_K_RANGE.contains(&top_k) {
            return Err(ViewError::TopKOutOfRange { value: top_k });
        }
        self.top_k = top_k;
        Ok(())
    }

    /// A search is only sent when the query has text.
    pub fn is_submittable(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn to_query(&self) -> TopicQuery {
        TopicQuery {
            query: self.query.clone(),
            author: self.author,
            surah: self.surah,
            language: self.language,
            top_k: self.top_k,
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

pub fn submit_tafsir<T: Transport>(
    client: &TafsirClient<T>,
    session: &Session,
    reference: &ReferenceData,
    form: &TafsirForm,
) -> Submission {
    let query = form.query();
    match client.fetch_tafsir(session.current_token(), &query) {
        Ok(resp) => Submission::Rendered(render_tafsir(reference, &query, &resp)),
        Err(e) => Submission::Error(e.to_string()),
    }
}

pub fn submit_reflection<T: Transport>(
    client: &TafsirClient<T>,
    session: &Session,
    reference: &ReferenceData,
    form: &ReflectionForm,
) -> Submission {
    let query = form.query();
    match client.fetch_reflection(session.current_token(), &query) {
        Ok(resp) => Submission::Rendered(render_reflection(reference, &query, &resp)),
        Err(e) => Submission::Error(e.to_string()),
    }
}

pub fn submit_topic<T: Transport>(
    client: &TafsirClient<T>,
    session: &Session,
    reference: &ReferenceData,
    form: &TopicForm,
) -> Submission {
    if !form.is_submittable() {
        return Submission::Skipped;
    }
    let query = form.to_query();
    match client.search_topic(session.current_token(), &query) {
        Ok(resp) => Submission::Rendered(render_search(reference, query.language, &resp)),
        Err(e) => Submission::Error(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render_tafsir(
    reference: &ReferenceData,
    query: &TafsirQuery,
    resp: &TafsirResponse,
) -> Vec<Block> {
    vec![
        Block::verse(reference.verse_locator(query.surah, query.ayah)),
        Block::body(&resp.tafsir_text, query.language.text_style()),
    ]
}

pub fn render_reflection(
    reference: &ReferenceData,
    query: &ReflectionQuery,
    resp: &ReflectionResponse,
) -> Vec<Block> {
    let mut blocks: Vec<Block> = (query.from_ayah..=query.to_ayah)
        .map(|ayah| Block::verse(reference.verse_locator(query.surah, ayah)))
        .collect();
    blocks.push(Block::heading(format!(
        "Reflection for Surah {}: Ayah {} - {}",
        query.surah, query.from_ayah, query.to_ayah
    )));
    blocks.push(Block::body(&resp.reflection, query.language.text_style()));
    blocks
}

/// Arabic shows the untranslated tafsir text; every other language shows the
/// translation.
pub fn render_search(
    reference: &ReferenceData,
    language: Language,
    resp: &SearchResponse,
) -> Vec<Block> {
    if resp.results.is_empty() {
        return vec![Block::notice("No results.")];
    }

    let mut blocks = Vec::new();
    for (i, hit) in resp.results.iter().enumerate() {
        if i > 0 {
            blocks.push(Block::Separator);
        }
        let surah_name = reference
            .surah_name(hit.surah)
            .or(hit.surah_name_english.as_deref())
            .unwrap_or_default();
        blocks.push(Block::heading(format!(
            "Surah {} ({}) - Ayah {} | Score: {}",
            hit.surah,
            surah_name,
            hit.ayah_range.start,
            format_score(hit.score)
        )));
        blocks.push(Block::verse(
            reference.verse_locator(hit.surah, hit.ayah_range.start),
        ));
        blocks.push(Block::field("Author", &hit.author));
        let text = match language {
            Language::Arabic => &hit.text,
            _ => &hit.translated_text,
        };
        blocks.push(Block::body(text, language.text_style()));
    }
    blocks
}

/// Score rounded to three decimals, without padding zeros (`0.5`, `0.912`).
fn format_score(score: f64) -> String {
    let rounded = (score * 1000.0).round() / 1000.0;
    format!("{rounded:?}")
}

// ---------------------------------------------------------------------------
// ViewController
// ---------------------------------------------------------------------------

/// Active mode plus the state of all three forms.
#[derive(Debug, Clone)]
pub struct ViewController {
    mode: ViewMode,
    pub tafsir: TafsirForm,
    pub reflection: ReflectionForm,
    pub topic: TopicForm,
}

impl ViewController {
    pub fn new(reference: &ReferenceData, language: Language, top_k: u8) -> Self {
        Self {
            mode: ViewMode::default(),
            tafsir: TafsirForm::new(reference, language),
            reflection: ReflectionForm::new(reference, language),
            topic: TopicForm::new(language, top_k),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Language of the active form, which decides the text style.
    pub fn language(&self) -> Language {
        match self.mode {
            ViewMode::Tafsir => self.tafsir.language,
            ViewMode::Reflection => self.reflection.language,
            ViewMode::TopicSearch => self.topic.language,
        }
    }

    /// Submit the active form: one blocking backend call at most.
    pub fn submit<T: Transport>(
        &self,
        client: &TafsirClient<T>,
        session: &Session,
        reference: &ReferenceData,
    ) -> Submission {
        match self.mode {
            ViewMode::Tafsir => submit_tafsir(client, session, reference, &self.tafsir),
            ViewMode::Reflection => {
                submit_reflection(client, session, reference, &self.reflection)
            }
            ViewMode::TopicSearch => submit_topic(client, session, reference, &self.topic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TextStyle;
    use crate::client::{AyahRange, HttpResponse, MockTransport, SearchHit};
    use crate::reference::{SurahIndex, SurahIndexEntry, VerseRecord, VerseTable};
    use serde_json::json;

    fn reference() -> ReferenceData {
        let index = SurahIndex::from_entries(vec![
            SurahIndexEntry {
                surah_number: 1,
                surah_name: "Al-Fatihah".into(),
                total_ayat: 7,
            },
            SurahIndexEntry {
                surah_number: 112,
                surah_name: "Al-Ikhlas".into(),
                total_ayat: 4,
            },
        ])
        .unwrap();
        let verses = VerseTable::from_records((1..=4).map(|a| VerseRecord {
            surah_number: 112,
            ayah_number: a,
            arabic_text: format!("آية {a}"),
        }));
        ReferenceData::new(index, verses)
    }

    fn client() -> TafsirClient<MockTransport> {
        TafsirClient::new("http://backend.test", MockTransport::new())
    }

    #[test]
    fn mode_cycles_through_all() {
        let mut mode = ViewMode::Tafsir;
        for expected in [ViewMode::Reflection, ViewMode::TopicSearch, ViewMode::Tafsir] {
            mode = mode.next();
            assert_eq!(mode, expected);
        }
    }

    #[test]
    fn to_choices_start_at_from() {
        let reference = reference();
        let mut form = ReflectionForm::new(&reference, Language::English);
        form.select_surah(&reference, 1).unwrap();
        for from in 1..=7 {
            form.select_from(&reference, from).unwrap();
            assert_eq!(form.to_choices(&reference), from..=7);
            assert!(form.to_ayah() >= form.from_ayah());
        }
    }

    #[test]
    fn raising_from_pulls_to_up() {
        let reference = reference();
        let mut form = ReflectionForm::new(&reference, Language::English);
        form.select_to(&reference, 3).unwrap();
        form.select_from(&reference, 5).unwrap();
        assert_eq!((form.from_ayah(), form.to_ayah()), (5, 5));
    }

    #[test]
    fn to_below_from_is_rejected() {
        let reference = reference();
        let mut form = ReflectionForm::new(&reference, Language::English);
        form.select_from(&reference, 4).unwrap();
        let err = form.select_to(&reference, 2).unwrap_err();
        assert!(matches!(err, ViewError::InvertedRange { from: 4, to: 2 }));
        assert_eq!(form.to_ayah(), 4);
    }

    #[test]
    fn switching_to_shorter_surah_clamps_range() {
        let reference = reference();
        let mut form = ReflectionForm::new(&reference, Language::English);
        form.select_from(&reference, 6).unwrap();
        form.select_to(&reference, 7).unwrap();
        form.select_surah(&reference, 112).unwrap();
        assert_eq!((form.from_ayah(), form.to_ayah()), (1, 1));
    }

    #[test]
    fn tafsir_ayah_bounded_by_surah_length() {
        let reference = reference();
        let mut form = TafsirForm::new(&reference, Language::Arabic);
        assert!(form.select_ayah(&reference, 7).is_ok());
        let err = form.select_ayah(&reference, 8).unwrap_err();
        assert!(matches!(err, ViewError::AyahOutOfRange { max: 7, .. }));
        assert!(form.select_surah(&reference, 3).is_err());
    }

    #[test]
    fn topic_surah_zero_means_all() {
        let reference = reference();
        let mut form = TopicForm::new(Language::Arabic, 3);
        form.select_surah(&reference, Some(112)).unwrap();
        assert_eq!(form.surah(), Some(112));
        form.select_surah(&reference, Some(0)).unwrap();
        assert_eq!(form.surah(), None);
        assert!(form.select_top_k(11).is_err());
        assert!(form.select_top_k(10).is_ok());
    }

    #[test]
    fn empty_query_sends_nothing() {
        let reference = reference();
        let c = client();
        let mut form = TopicForm::new(Language::English, 3);
        form.author = Some(Author::Tabari);
        form.select_surah(&reference, Some(1)).unwrap();
        form.query = "   ".into();
        let outcome = submit_topic(&c, &Session::new(), &reference, &form);
        assert_eq!(outcome, Submission::Skipped);
        assert!(c.transport().requests().is_empty());
    }

    #[test]
    fn query_is_sent_as_typed() {
        let reference = reference();
        let c = client();
        c.transport().push_json(200, json!({"results": []}));
        let mut form = TopicForm::new(Language::English, 3);
        form.query = "  patience ".into();
        submit_topic(&c, &Session::new(), &reference, &form);
        let req = c.transport().last_request().unwrap();
        assert_eq!(req.query_value("q"), Some("  patience "));
    }

    #[test]
    fn search_error_payload_is_shown_verbatim() {
        let reference = reference();
        let c = client();
        c.transport()
            .push_json(200, json!({"error": "No results found"}));
        let mut form = TopicForm::new(Language::Arabic, 3);
        form.query = "sabr".into();
        let outcome = submit_topic(&c, &Session::new(), &reference, &form);
        assert_eq!(outcome, Submission::Error("No results found".into()));
    }

    #[test]
    fn score_is_rounded_without_padding() {
        assert_eq!(format_score(0.5), "0.5");
        assert_eq!(format_score(0.91234), "0.912");
        assert_eq!(format_score(0.9996), "1.0");
    }

    #[test]
    fn tafsir_render_uses_language_style() {
        let reference = reference();
        let query = TafsirQuery {
            author: Author::Tabari,
            surah: 112,
            ayah: 1,
            language: Language::Arabic,
        };
        let resp = TafsirResponse {
            tafsir_text: "تفسير".into(),
        };
        let blocks = render_tafsir(&reference, &query, &resp);
        assert_eq!(blocks[0], Block::verse("112:1 آية 1"));
        assert_eq!(blocks[1], Block::body("تفسير", TextStyle::Arabic));

        for (lang, style) in [
            (Language::English, TextStyle::Latin),
            (Language::French, TextStyle::Latin),
            (Language::German, TextStyle::Latin),
            (Language::Spanish, TextStyle::Latin),
            (Language::Urdu, TextStyle::Urdu),
        ] {
            let blocks = render_tafsir(&reference, &TafsirQuery { language: lang, ..query.clone() }, &resp);
            assert_eq!(blocks[1], Block::body("تفسير", style), "{lang:?}");
        }
    }

    #[test]
    fn reflection_render_lists_every_verse() {
        let reference = reference();
        let query = ReflectionQuery {
            author: Author::Alrazi,
            surah: 112,
            from_ayah: 2,
            to_ayah: 4,
            language: Language::English,
        };
        let blocks = render_reflection(
            &reference,
            &query,
            &ReflectionResponse {
                reflection: "Oneness".into(),
            },
        );
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0], Block::verse("112:2 آية 2"));
        assert_eq!(blocks[2], Block::verse("112:4 آية 4"));
        assert_eq!(
            blocks[3],
            Block::heading("Reflection for Surah 112: Ayah 2 - 4")
        );
        assert_eq!(blocks[4], Block::body("Oneness", TextStyle::Latin));
    }

    fn hit(surah: u16) -> SearchHit {
        SearchHit {
            surah,
            ayah_range: AyahRange { start: 1, end: 2 },
            score: 0.91234,
            author: "tabari".into(),
            text: "النص العربي".into(),
            translated_text: "translated".into(),
            surah_name_english: Some("The Sincerity".into()),
        }
    }

    #[test]
    fn search_render_picks_text_by_language() {
        let reference = reference();
        let resp = SearchResponse {
            results: vec![hit(112)],
        };
        let arabic = render_search(&reference, Language::Arabic, &resp);
        assert_eq!(
            arabic[0],
            Block::heading("Surah 112 (Al-Ikhlas) - Ayah 1 | Score: 0.912")
        );
        assert_eq!(arabic[1], Block::verse("112:1 آية 1"));
        assert_eq!(arabic[2], Block::field("Author", "tabari"));
        assert_eq!(arabic[3], Block::body("النص العربي", TextStyle::Arabic));

        let urdu = render_search(&reference, Language::Urdu, &resp);
        assert_eq!(urdu[3], Block::body("translated", TextStyle::Urdu));
        let english = render_search(&reference, Language::English, &resp);
        assert_eq!(english[3], Block::body("translated", TextStyle::Latin));
    }

    #[test]
    fn search_render_falls_back_to_payload_name() {
        let reference = reference();
        let blocks = render_search(
            &reference,
            Language::English,
            &SearchResponse {
                results: vec![hit(36), hit(112)],
            },
        );
        assert_eq!(
            blocks[0],
            Block::heading("Surah 36 (The Sincerity) - Ayah 1 | Score: 0.912")
        );
        assert_eq!(blocks[1], Block::verse("not found"));
        assert_eq!(blocks[4], Block::Separator);
    }

    #[test]
    fn error_is_rendered_alone() {
        let reference = reference();
        let c = client();
        c.transport()
            .push_response(HttpResponse::new(500, "Internal Server Error"));
        let controller = ViewController::new(&reference, Language::Arabic, 3);
        let outcome = controller.submit(&c, &Session::new(), &reference);
        assert_eq!(outcome, Submission::Error("Internal Server Error".into()));
        assert_eq!(outcome.into_blocks(), vec![Block::error("Internal Server Error")]);
    }

    #[test]
    fn controller_dispatches_on_mode() {
        let reference = reference();
        let c = client();
        c.transport().push_json(200, json!({"reflection": "r"}));
        let mut controller = ViewController::new(&reference, Language::English, 3);
        controller.set_mode(ViewMode::Reflection);
        let outcome = controller.submit(&c, &Session::with_token("tok"), &reference);
        assert!(matches!(outcome, Submission::Rendered(_)));
        let req = c.transport().last_request().unwrap();
        assert_eq!(req.path, "/reflect");
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
    }
}
