//! TwiML rendering.
//!
//! Produces the call-control documents the telephony provider fetches when a
//! dispatched call connects. Rendering is pure string assembly; every
//! free-text field is XML-escaped before embedding so caller-supplied content
//! cannot inject verbs into the control document.

/// Default maximum recording length in seconds.
pub const DEFAULT_MAX_RECORDING_SECS: u32 = 300;

/// Default DTMF key that finishes a recording.
pub const DEFAULT_FINISH_KEY: char = '#';

/// Escape a string for embedding in XML text or attribute content.
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap rendered verbs in the `<Response>` envelope.
fn respond(verbs: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>{verbs}</Response>")
}

/// An empty control document, used to acknowledge webhooks without acting.
pub fn empty() -> String {
    respond("")
}

/// Speak a two-factor verification code.
///
/// Reads the code digit-by-digit with inter-digit pauses, then repeats it
/// once before saying goodbye.
pub fn speak_code(code: &str) -> String {
    let spaced: String = code
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let spaced = xml_escape(&spaced);
    respond(&format!(
        "<Say>Hello. Your verification code is.</Say>\
         <Say>{spaced}</Say>\
         <Pause length=\"1\"/>\
         <Say>Once again, your code is.</Say>\
         <Say>{spaced}</Say>\
         <Say>Goodbye.</Say>"
    ))
}

/// Speak an arbitrary message on behalf of a named sender.
pub fn speak_message(message: &str, from_name: &str) -> String {
    let from_name = xml_escape(from_name);
    let message = xml_escape(message);
    respond(&format!(
        "<Say>You have a message from {from_name}.</Say>\
         <Pause length=\"1\"/>\
         <Say>{message}</Say>\
         <Pause length=\"1\"/>\
         <Say>Thank you. Goodbye.</Say>"
    ))
}

/// Play a provider-fetchable audio URL on behalf of a named sender.
pub fn play_audio(audio_url: &str, from_name: &str) -> String {
    let from_name = xml_escape(from_name);
    let audio_url = xml_escape(audio_url);
    respond(&format!(
        "<Say>You have a message from {from_name}.</Say>\
         <Play>{audio_url}</Play>\
         <Say>Thank you. Goodbye.</Say>"
    ))
}

/// Prompt the callee to record a message after the tone.
///
/// Recording stops on `finish_key` or after `max_length_secs`. The recording
/// itself is delivered later through the recording-status webhook configured
/// at call placement, so no `action` round-trip is needed here.
pub fn prompt_and_record(max_length_secs: u32, finish_key: char) -> String {
    respond(&format!(
        "<Say>Please record your message after the tone. \
         Press {finish_key} when you are done.</Say>\
         <Record maxLength=\"{max_length_secs}\" finishOnKey=\"{finish_key}\" playBeep=\"true\"/>\
         <Say>Thank you. Goodbye.</Say>"
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
