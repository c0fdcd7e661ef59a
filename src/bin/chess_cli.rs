// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Plays a two-player game in the terminal.
//!
//! Usage: `chess_cli [MATCH_LOG]`
//!
//! Enter moves in coordinate notation (`e2e4`), a square name (`g1`) to
//! list its destinations, `reset` to start over or `quit` to leave.
//! Finished games are appended to `MATCH_LOG` (default
//! `matches.jsonl`). Set `RUST_LOG=info` to follow the engine.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use chess_rules::game::{
    ChessSession, ClickResult, GameId, JsonLinesRecorder, RecordingStatus, SessionConfig,
};
use chess_rules::{Move, Square};

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "matches.jsonl".to_string());
    #[cfg(feature = "random")]
    let id = GameId::random();
    #[cfg(not(feature = "random"))]
    let id = GameId::new(0);
    let mut session = ChessSession::new(id, SessionConfig::default(), JsonLinesRecorder::new(path));

    print!("{}", session.board().position());
    println!("{}", session.status_line());
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "reset" => session.reset(),
            text => {
                if let Some(square) = Square::try_from_string(text) {
                    let destinations = session.board().legal_destinations(square);
                    let names: Vec<String> = destinations.iter().map(|sq| sq.to_string()).collect();
                    println!("{}: {}", square, names.join(" "));
                    continue;
                }
                let Some(mv) = Move::try_from_string(text) else {
                    println!("expected a move like e2e4 or a square like g1");
                    continue;
                };
                match session.play(mv) {
                    Ok(ClickResult::Moved {
                        recording: Some(RecordingStatus::Failed(reason)),
                        ..
                    }) => println!("could not save the result: {}", reason),
                    Ok(_) => {}
                    Err(err) => {
                        println!("{}", err);
                        continue;
                    }
                }
            }
        }
        print!("{}", session.board().position());
        println!("{}", session.status_line());
        io::stdout().flush()?;
    }
    Ok(())
}
