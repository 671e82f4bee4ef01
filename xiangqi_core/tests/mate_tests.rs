#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use xiangqi_core::engine::config::EngineConfig;
    use xiangqi_core::engine::search::AlphaBetaEngine;
    use xiangqi_core::engine::{Move, Searcher};
    use xiangqi_core::logic::board::{Board, BoardCoordinate, Color, PieceType};
    use xiangqi_core::logic::game::{GameState, GameStatus};
    use xiangqi_core::logic::rules::{check_game_end, EndReason};

    fn sq(row: usize, col: usize) -> BoardCoordinate {
        BoardCoordinate::new(row, col).unwrap()
    }

    /// Red to move. Sliding the crossed soldier off the centre file leaves
    /// the cannon exactly one screen from the boxed-in black general.
    fn cannon_mate_in_1() -> Board {
        let mut board = Board::empty();
        board.add_piece(9, 3, PieceType::General, Color::Red);
        board.add_piece(7, 4, PieceType::Cannon, Color::Red);
        board.add_piece(4, 4, PieceType::Soldier, Color::Red);

        board.add_piece(0, 4, PieceType::General, Color::Black);
        board.add_piece(0, 3, PieceType::Advisor, Color::Black);
        board.add_piece(0, 5, PieceType::Advisor, Color::Black);
        // Blocks the only flight square
        board.add_piece(1, 4, PieceType::Soldier, Color::Black);
        board
    }

    fn game_from(board: Board, turn: Color) -> GameState {
        let mut game = GameState::new();
        game.board = board;
        game.turn = turn;
        game
    }

    #[test]
    fn test_checkmate_detection() {
        let mut game = game_from(cannon_mate_in_1(), Color::Red);
        assert!(!game.is_in_check());

        game.make_move(sq(4, 4), sq(4, 3)).unwrap();

        assert_eq!(game.status, GameStatus::Checkmate(Color::Red));
        let verdict = check_game_end(&game.board, Color::Red);
        assert!(verdict.is_over);
        assert_eq!(verdict.winner, Some(Color::Red));
        assert_eq!(verdict.reason, Some(EndReason::Checkmate));
    }

    #[test]
    fn test_forward_push_is_not_mate() {
        let mut game = game_from(cannon_mate_in_1(), Color::Red);
        // Two screens between cannon and general.
        game.make_move(sq(4, 4), sq(3, 4)).unwrap();
        assert_eq!(game.status, GameStatus::Playing);
        assert!(!game.is_in_check());
    }

    #[test]
    fn test_engine_finds_mate_in_1() {
        let config = Arc::new(EngineConfig::default());
        let mut engine = AlphaBetaEngine::new(config);
        let mut game = game_from(cannon_mate_in_1(), Color::Red);

        let mv = game.play_engine_move(&mut engine, 2).unwrap();
        assert!(mv.is_some());
        assert_eq!(game.status, GameStatus::Checkmate(Color::Red));
    }

    #[test]
    fn test_engine_finds_mate_in_1_as_black() {
        let mut engine = AlphaBetaEngine::default();
        let mut game = game_from(cannon_mate_in_1().mirrored(), Color::Black);

        let mv = game.play_engine_move(&mut engine, 2).unwrap();
        assert!(mv.is_some());
        assert_eq!(game.status, GameStatus::Checkmate(Color::Black));
    }

    #[test]
    fn test_mated_side_gets_no_move() {
        let board = cannon_mate_in_1().with_move(Move::new(sq(4, 4), sq(4, 5)));
        let mut engine = AlphaBetaEngine::default();
        assert_eq!(engine.best_move(&board, Color::Black, 3), None);

        let mut game = game_from(board, Color::Black);
        assert_eq!(game.play_engine_move(&mut engine, 3), Ok(None));
        assert!(game.history.is_empty());
    }
}
