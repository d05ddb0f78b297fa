use super::props::Props;
use crate::sanitize::escape_attribute;
use crate::sanitize::url::safe_resource_url;
use regex::Regex;
use std::fmt::{self, Write};
use std::sync::OnceLock;

/// Where a video prop points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    YouTube(String),
    Vimeo(String),
    File(String),
}

fn youtube_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{6,})",
        )
        .expect("static regex")
    })
}

fn vimeo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)vimeo\.com/(?:video/|channels/[^/]+/|groups/[^/]+/videos/)?(\d+)")
            .expect("static regex")
    })
}

impl VideoSource {
    /// Classify a video URL. Recognized platforms yield their video id; anything else must
    /// be a safe resource URL to play natively.
    pub fn parse(url: &str) -> Option<VideoSource> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        if let Some(caps) = youtube_regex().captures(url) {
            return Some(VideoSource::YouTube(caps[1].to_string()));
        }
        if let Some(caps) = vimeo_regex().captures(url) {
            return Some(VideoSource::Vimeo(caps[1].to_string()));
        }
        safe_resource_url(url, false).map(VideoSource::File)
    }
}

#[derive(Debug, Clone, Copy)]
struct Playback {
    autoplay: bool,
    muted: bool,
    looping: bool,
    controls: bool,
}

fn embed_url(source: &VideoSource, playback: Playback) -> Option<String> {
    let (base, id, mute_key) = match source {
        VideoSource::YouTube(id) => ("https://www.youtube-nocookie.com/embed/", id, "mute"),
        VideoSource::Vimeo(id) => ("https://player.vimeo.com/video/", id, "muted"),
        VideoSource::File(_) => return None,
    };
    let mut params: Vec<String> = Vec::new();
    if playback.autoplay {
        params.push("autoplay=1".to_string());
    }
    if playback.muted {
        params.push(format!("{mute_key}=1"));
    }
    if playback.looping {
        params.push("loop=1".to_string());
        if matches!(source, VideoSource::YouTube(_)) {
            params.push(format!("playlist={id}"));
        }
    }
    if !playback.controls {
        params.push("controls=0".to_string());
    }
    let mut url = format!("{base}{id}");
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    Some(url)
}

/// Render a video node: a privacy-friendly embed for YouTube/Vimeo, a native `<video>` for
/// direct files, a placeholder when the URL is missing or unsafe.
pub fn render_video(out: &mut String, id: &str, props: Props<'_>, children: &str) -> fmt::Result {
    let playback = Playback {
        autoplay: props.bool("autoplay").unwrap_or(false),
        muted: props.bool("muted").unwrap_or(false),
        looping: props.bool("loop").unwrap_or(false),
        controls: props.bool("controls").unwrap_or(true),
    };
    let title = props.str("title").unwrap_or("Video");
    let source = props
        .first_str(&["url", "src", "videoUrl"])
        .and_then(VideoSource::parse);

    match &source {
        Some(VideoSource::File(src)) => {
            write!(out, "<video id=\"{}\" class=\"pc-video\"", escape_attribute(id))?;
            for (on, attr) in [
                (playback.controls, " controls"),
                (playback.autoplay, " autoplay"),
                (playback.muted, " muted"),
                (playback.looping, " loop"),
            ] {
                if on {
                    out.push_str(attr);
                }
            }
            out.push_str(" playsinline");
            if let Some(poster) = props.str("poster").and_then(|p| safe_resource_url(p, true)) {
                write!(out, " poster=\"{}\"", escape_attribute(&poster))?;
            }
            write!(
                out,
                "><source src=\"{}\">{}</video>",
                escape_attribute(src),
                children
            )
        }
        Some(embedded) => {
            let src = embed_url(embedded, playback).unwrap_or_default();
            write!(
                out,
                "<div id=\"{}\" class=\"pc-video\"><iframe src=\"{}\" title=\"{}\" \
                 allow=\"accelerometer; autoplay; encrypted-media; gyroscope; picture-in-picture\" \
                 allowfullscreen loading=\"lazy\"></iframe>{}</div>",
                escape_attribute(id),
                escape_attribute(&src),
                escape_attribute(title),
                children
            )
        }
        None => write!(
            out,
            "<div id=\"{}\" class=\"pc-video pc-video-placeholder\" role=\"img\" aria-label=\"{}\">{}</div>",
            escape_attribute(id),
            escape_attribute(title),
            children
        ),
    }
}
