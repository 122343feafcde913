use turn_nav_lib::ports::SpeechSink;

/// Prints announcements to stdout in place of a text-to-speech engine
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSpeech;

impl SpeechSink for ConsoleSpeech {
    fn speak(&self, text: &str) {
        println!("say: {text}");
    }
}
