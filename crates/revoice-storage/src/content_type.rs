/// Content type for an object key extension such as `.wav`
///
/// Unknown extensions map to `audio/<ext>`.
pub fn content_type_for(extension: &str) -> String {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();

    match ext.as_str() {
        "wav" => "audio/wav".to_owned(),
        "mp3" => "audio/mpeg".to_owned(),
        "flac" => "audio/flac".to_owned(),
        "ogg" => "audio/ogg".to_owned(),
        "opus" => "audio/opus".to_owned(),
        "m4a" => "audio/mp4".to_owned(),
        _ => format!("audio/{ext}"),
    }
}
