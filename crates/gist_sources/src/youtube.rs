//! # YouTube transcripts
//!
//! Caption tracks are listed in the `ytInitialPlayerResponse` object embedded in
//! the watch page. A track in the requested language is preferred; otherwise any
//! translatable track is fetched through YouTube's own translation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::ExtractError;

static YT_PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s|</script>)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for automatic speech recognition tracks.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_translatable: bool,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn speaks(&self, language: &str) -> bool {
        primary_subtag(&self.language_code).eq_ignore_ascii_case(language)
    }
}

#[derive(Debug, PartialEq)]
pub enum TrackChoice<'a> {
    Native(&'a CaptionTrack),
    Translated {
        track: &'a CaptionTrack,
        language: String,
    },
}

impl TrackChoice<'_> {
    pub fn transcript_url(&self) -> String {
        match self {
            TrackChoice::Native(track) => format!("{}&fmt=json3", track.base_url),
            TrackChoice::Translated { track, language } => {
                format!("{}&fmt=json3&tlang={language}", track.base_url)
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum TranscriptLookup {
    Found(Vec<String>),
    Unavailable,
}

fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Lists the caption tracks advertised by a watch page.
///
/// A page without a `captions` section yields an empty list; a page without a
/// player response at all is a parse error.
pub fn parse_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>, ExtractError> {
    let player_response = YT_PLAYER_RESPONSE_RE
        .captures(html)
        .and_then(|cap| cap.get(1))
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .ok_or(ExtractError::ParseError(
            "Failed to extract ytInitialPlayerResponse from the page's script tag",
        ))?;

    let tracks = &player_response["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"];
    if tracks.is_null() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_value(tracks.clone())?)
}

/// Picks the track to read: a human-made track in `language`, then a
/// generated one, then a translation of any translatable track.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<TrackChoice<'a>> {
    let language = primary_subtag(language);

    let native = tracks
        .iter()
        .filter(|t| t.speaks(language))
        .min_by_key(|t| t.is_generated());
    if let Some(track) = native {
        return Some(TrackChoice::Native(track));
    }

    tracks
        .iter()
        .filter(|t| t.is_translatable)
        .min_by_key(|t| t.is_generated())
        .map(|track| TrackChoice::Translated {
            track,
            language: language.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Returns the caption lines of a `fmt=json3` transcript, in order.
pub fn parse_json3(body: &str) -> Result<Vec<String>, ExtractError> {
    let transcript = serde_json::from_str::<Json3Transcript>(body)?;

    let lines = transcript
        .events
        .into_iter()
        .map(|event| {
            event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    Ok(lines)
}

pub struct YouTube {
    client: reqwest::Client,
    watch_url: String,
}

impl YouTube {
    const WATCH_URL: &str = "https://www.youtube.com/watch";

    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            watch_url: Self::WATCH_URL.into(),
        }
    }

    pub fn with_watch_url(mut self, url: impl Into<String>) -> Self {
        self.watch_url = url.into();
        self
    }

    async fn get_text(&self, url: &str) -> Result<String, ExtractError> {
        let resp = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            return Err(ExtractError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.text().await?)
    }

    /// Fetches the transcript of `video_id` in `language`, falling back to a
    /// translated track.
    #[tracing::instrument(skip(self))]
    pub async fn transcript(
        &self,
        video_id: &str,
        language: &str,
    ) -> Result<TranscriptLookup, ExtractError> {
        let watch_page = self
            .get_text(&format!("{}?v={video_id}", self.watch_url))
            .await?;
        let tracks = parse_caption_tracks(&watch_page)?;

        let Some(choice) = select_track(&tracks, language) else {
            tracing::info!(tracks = tracks.len(), "No usable caption track");
            return Ok(TranscriptLookup::Unavailable);
        };

        if let TrackChoice::Translated { track, .. } = &choice {
            tracing::info!(from = %track.language_code, "Falling back to a translated transcript");
        }

        let body = self.get_text(&choice.transcript_url()).await?;
        let lines = parse_json3(&body)?;
        if lines.is_empty() {
            return Ok(TranscriptLookup::Unavailable);
        }

        Ok(TranscriptLookup::Found(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_PAGE: &str = include_str!("../tests/fixtures/watch.html");
    const TRANSCRIPT: &str = include_str!("../tests/fixtures/transcript.json3");

    #[test]
    fn test_fixture_lists_caption_tracks() {
        let tracks = parse_caption_tracks(WATCH_PAGE).expect("Failed to parse tracks");

        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].language_code, "sw");
        assert!(tracks[1].is_generated());
        assert!(tracks.iter().all(|t| t.is_translatable));
    }

    #[test]
    fn test_page_without_player_response() {
        let result = parse_caption_tracks("<html><body>Video unavailable</body></html>");
        assert!(matches!(result, Err(ExtractError::ParseError(_))));
    }

    #[test]
    fn test_page_without_captions_has_no_tracks() {
        let html = r#"<script>var ytInitialPlayerResponse = {"videoDetails": {"videoId": "x"}};</script>"#;
        let tracks = parse_caption_tracks(html).expect("Failed to parse player response");
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_human_track_preferred_over_generated() {
        let tracks = parse_caption_tracks(WATCH_PAGE).unwrap();

        match select_track(&tracks, "en_US.UTF-8") {
            Some(TrackChoice::Native(track)) => assert_eq!(track.language_code, "en-GB"),
            other => panic!("Expected a native English track, got {other:?}"),
        }
    }

    #[test]
    fn test_translation_fallback() {
        let tracks = parse_caption_tracks(WATCH_PAGE).unwrap();

        let choice = select_track(&tracks, "fr").expect("Expected a translated track");
        match &choice {
            TrackChoice::Translated { track, language } => {
                assert_eq!(track.language_code, "sw");
                assert_eq!(language, "fr");
            }
            TrackChoice::Native(_) => panic!("No French track exists"),
        }
        assert!(choice.transcript_url().ends_with("&fmt=json3&tlang=fr"));
    }

    #[test]
    fn test_untranslatable_tracks_are_not_selected() {
        let tracks = vec![CaptionTrack {
            base_url: "https://example.com/t?v=1".into(),
            language_code: "de".into(),
            kind: None,
            is_translatable: false,
        }];
        assert_eq!(select_track(&tracks, "en"), None);
    }

    #[test]
    fn test_json3_lines() {
        let lines = parse_json3(TRANSCRIPT).expect("Failed to parse transcript");
        assert_eq!(
            lines,
            vec![
                "the committee will now come to order".to_string(),
                "we begin with the estimates".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_transcript_fetches_selected_track() {
        let mut server = mockito::Server::new_async().await;
        let track_url = format!("{}/api/timedtext?v=abc&lang=en", server.url());
        let page = format!(
            r#"<script>var ytInitialPlayerResponse = {{"captions": {{"playerCaptionsTracklistRenderer": {{"captionTracks": [{{"baseUrl": "{track_url}", "languageCode": "en"}}]}}}}}};</script>"#
        );

        let watch = server
            .mock("GET", "/watch")
            .match_query(mockito::Matcher::UrlEncoded("v".into(), "abc".into()))
            .with_body(page)
            .create_async()
            .await;
        let timedtext = server
            .mock("GET", "/api/timedtext")
            .match_query(mockito::Matcher::UrlEncoded("fmt".into(), "json3".into()))
            .with_body(TRANSCRIPT)
            .create_async()
            .await;

        let youtube = YouTube::new(reqwest::Client::new())
            .with_watch_url(format!("{}/watch", server.url()));
        let lookup = youtube.transcript("abc", "en").await.expect("lookup failed");

        watch.assert_async().await;
        timedtext.assert_async().await;
        assert!(matches!(lookup, TranscriptLookup::Found(lines) if lines.len() == 2));
    }

    #[tokio::test]
    async fn test_transcript_unavailable_without_tracks() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/watch")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"<script>var ytInitialPlayerResponse = {"playabilityStatus": {}};</script>"#)
            .create_async()
            .await;

        let youtube = YouTube::new(reqwest::Client::new())
            .with_watch_url(format!("{}/watch", server.url()));
        let lookup = youtube.transcript("abc", "en").await.expect("lookup failed");

        assert_eq!(lookup, TranscriptLookup::Unavailable);
    }
}
