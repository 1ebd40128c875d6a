//! Example program that decodes a MIDI file and prints every note it contains

use notefold::decode_file;

fn main() {
    let path = std::env::args()
        .nth(1)
        .expect("Usage: notes <path to .mid file>");

    let notes = decode_file(&path).expect("Decode MIDI file into notes");

    for note in &notes {
        println!(
            "channel {:>2}  pitch {:>3}  start {:>8}  duration {:>6}",
            note.channel, note.pitch, note.start, note.duration
        )
    }

    println!("{} notes in {path}", notes.len())
}
