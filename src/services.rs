//! Seams to the remote collaborators: player identity, the leaderboard and the
//! on-chain score contract. The game loop never calls these; the host does so
//! after a session has ended, and failures are logged and returned without
//! touching session state.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::ServiceError;
use crate::game::session::FinalScore;

/// Wallet address, normalised to lowercase `0x` + 40 hex digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let lower = raw.trim().to_ascii_lowercase();
        let hex = lower
            .strip_prefix("0x")
            .ok_or_else(|| ServiceError::InvalidAddress(raw.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ServiceError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(lower))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 20;

    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidUsername("please enter a username".into()));
        }
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&name.len()) {
            return Err(ServiceError::InvalidUsername(format!(
                "must be between {}-{} characters",
                Self::MIN_LEN,
                Self::MAX_LEN
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(ServiceError::InvalidUsername(
                "can only contain letters, numbers, - and _".into(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Usernames are unique ignoring ASCII case.
    pub fn same_as(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

/// Who is playing. Supplied by the wallet provider before a session may start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub wallet: WalletAddress,
    pub username: Username,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    /// Shortened form for notices (`0x12345678...`).
    pub fn short(&self) -> &str {
        self.0.get(..10).unwrap_or(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: Username,
    pub wallet: WalletAddress,
    pub highest_score: u32,
    pub best_streak: u32,
    pub tx_hash: Option<TxHash>,
}

/// What a submit did to the player's standing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    NewHighScore,
    Recorded,
}

pub trait Leaderboard {
    fn submit(
        &mut self,
        player: &PlayerIdentity,
        score: &FinalScore,
        tx: Option<&TxHash>,
    ) -> Result<SubmitOutcome, ServiceError>;

    /// Best entry per player, ordered by score then best streak, both descending.
    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ServiceError>;

    /// Wallet that registered `username` (case-insensitive), if any.
    fn username_owner(&self, username: &str) -> Result<Option<WalletAddress>, ServiceError>;

    /// Store the player row. A wallet has exactly one row; saving again renames it.
    fn save_player(&mut self, player: &PlayerIdentity) -> Result<(), ServiceError>;

    /// Registered identity for a returning wallet.
    fn player_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<PlayerIdentity>, ServiceError>;
}

/// Score contract on the game's chain.
pub trait ChainSubmitter {
    /// Chain the connected wallet is currently on.
    fn chain_id(&self) -> Result<u64, ServiceError>;

    fn submit_score(&mut self, username: &Username, score: u32, best_streak: u32) -> Result<TxHash, ServiceError>;
}

/// In-process leaderboard keeping one best row per wallet.
#[derive(Debug, Default)]
pub struct InMemoryLeaderboard {
    players: Vec<PlayerIdentity>,
    entries: Vec<LeaderboardEntry>,
    history: Vec<(WalletAddress, FinalScore)>,
}

impl InMemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submitted score, best or not, in submission order.
    pub fn history(&self) -> &[(WalletAddress, FinalScore)] {
        &self.history
    }
}

impl Leaderboard for InMemoryLeaderboard {
    fn submit(
        &mut self,
        player: &PlayerIdentity,
        score: &FinalScore,
        tx: Option<&TxHash>,
    ) -> Result<SubmitOutcome, ServiceError> {
        self.history.push((player.wallet.clone(), *score));
        let fresh = LeaderboardEntry {
            username: player.username.clone(),
            wallet: player.wallet.clone(),
            highest_score: score.score,
            best_streak: score.best_streak,
            tx_hash: tx.cloned(),
        };
        match self.entries.iter_mut().find(|e| e.wallet == player.wallet) {
            Some(existing) => {
                if (score.score, score.best_streak) > (existing.highest_score, existing.best_streak) {
                    *existing = fresh;
                    Ok(SubmitOutcome::NewHighScore)
                } else {
                    Ok(SubmitOutcome::Recorded)
                }
            }
            None => {
                self.entries.push(fresh);
                Ok(SubmitOutcome::NewHighScore)
            }
        }
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let mut rows = self.entries.clone();
        rows.sort_by(|a, b| {
            b.highest_score
                .cmp(&a.highest_score)
                .then(b.best_streak.cmp(&a.best_streak))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    fn username_owner(&self, username: &str) -> Result<Option<WalletAddress>, ServiceError> {
        let registered = self.players.iter().find(|p| p.username.same_as(username)).map(|p| &p.wallet);
        let scored = || self.entries.iter().find(|e| e.username.same_as(username)).map(|e| &e.wallet);
        Ok(registered.or_else(scored).cloned())
    }

    fn save_player(&mut self, player: &PlayerIdentity) -> Result<(), ServiceError> {
        match self.players.iter_mut().find(|p| p.wallet == player.wallet) {
            Some(existing) => *existing = player.clone(),
            None => self.players.push(player.clone()),
        }
        Ok(())
    }

    fn player_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<PlayerIdentity>, ServiceError> {
        Ok(self.players.iter().find(|p| &p.wallet == wallet).cloned())
    }
}

/// Validate and reserve a username for `wallet`, refusing a name already held
/// by another wallet. The row is stored before returning.
pub fn register_player<L: Leaderboard + ?Sized>(
    board: &mut L,
    wallet: &str,
    username: &str,
) -> Result<PlayerIdentity, ServiceError> {
    let wallet = WalletAddress::parse(wallet)?;
    let username = Username::parse(username)?;
    if let Some(owner) = board.username_owner(username.as_str())? {
        if owner != wallet {
            return Err(ServiceError::UsernameTaken(username.as_str().to_string()));
        }
    }
    let player = PlayerIdentity { wallet, username };
    board.save_player(&player)?;
    Ok(player)
}

/// Identity already registered for `wallet`, so a returning player skips the username prompt.
pub fn returning_player<L: Leaderboard + ?Sized>(
    board: &L,
    wallet: &str,
) -> Result<Option<PlayerIdentity>, ServiceError> {
    let wallet = WalletAddress::parse(wallet)?;
    board.player_by_wallet(&wallet)
}

/// Tracks whether the current result has already been pushed out.
#[derive(Debug, Default)]
pub struct ScoreSubmission {
    submitted: Option<TxHash>,
}

impl ScoreSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted.is_some()
    }

    pub fn tx_hash(&self) -> Option<&TxHash> {
        self.submitted.as_ref()
    }

    /// Chain first, then leaderboard. Only a finished, not yet submitted session
    /// qualifies. Nothing is marked submitted unless both calls succeed.
    pub fn submit<C, L>(
        &mut self,
        cfg: &GameConfig,
        player: &PlayerIdentity,
        result: Option<FinalScore>,
        chain: &mut C,
        board: &mut L,
    ) -> Result<(TxHash, SubmitOutcome), ServiceError>
    where
        C: ChainSubmitter + ?Sized,
        L: Leaderboard + ?Sized,
    {
        if self.is_submitted() {
            return Err(ServiceError::AlreadySubmitted);
        }
        let score = result.ok_or(ServiceError::SessionNotEnded)?;

        let actual = chain.chain_id().inspect_err(|e| warn!("chain id lookup failed: {e}"))?;
        if actual != cfg.chain_id {
            warn!("refusing to submit on chain {actual}");
            return Err(ServiceError::WrongNetwork { expected: cfg.chain_id, actual });
        }

        let tx = chain
            .submit_score(&player.username, score.score, score.best_streak)
            .inspect_err(|e| warn!("on-chain submit failed: {e}"))?;
        if tx.0.trim().is_empty() {
            warn!("on-chain submit returned no transaction hash");
            return Err(ServiceError::MissingTxHash);
        }

        let outcome = board
            .submit(player, &score, Some(&tx))
            .inspect_err(|e| warn!("leaderboard submit failed after tx {}: {e}", tx.0))?;
        info!("score {} submitted in tx {}...", score.score, tx.short());
        self.submitted = Some(tx.clone());
        Ok((tx, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameOutcome;

    const WALLET_A: &str = "0xAbCdEf0000000000000000000000000000000001";
    const WALLET_B: &str = "0x0000000000000000000000000000000000000002";

    fn id(wallet: &str, name: &str) -> PlayerIdentity {
        PlayerIdentity {
            wallet: WalletAddress::parse(wallet).unwrap(),
            username: Username::parse(name).unwrap(),
        }
    }

    fn result(score: u32, best_streak: u32) -> FinalScore {
        FinalScore { score, best_streak, outcome: GameOutcome::OutOfLives }
    }

    struct FakeChain {
        chain_id: u64,
        fail: bool,
        calls: u32,
    }

    impl ChainSubmitter for FakeChain {
        fn chain_id(&self) -> Result<u64, ServiceError> {
            Ok(self.chain_id)
        }
        fn submit_score(&mut self, _u: &Username, _s: u32, _b: u32) -> Result<TxHash, ServiceError> {
            self.calls += 1;
            if self.fail {
                Err(ServiceError::Rejected("user denied".into()))
            } else {
                Ok(TxHash(format!("0xdeadbeef{:04}", self.calls)))
            }
        }
    }

    #[test]
    fn wallet_is_normalised_and_checked() {
        let w = WalletAddress::parse(WALLET_A).unwrap();
        assert_eq!(w.as_str(), "0xabcdef0000000000000000000000000000000001");
        assert!(WalletAddress::parse("0x123").is_err());
        assert!(WalletAddress::parse("abcdef0000000000000000000000000000000001").is_err());
        assert!(WalletAddress::parse("0xzzcdef0000000000000000000000000000000001").is_err());
    }

    #[test]
    fn username_rules() {
        assert_eq!(Username::parse("  elf_01 ").unwrap().as_str(), "elf_01");
        assert!(Username::parse("").is_err());
        assert!(Username::parse("ab").is_err());
        assert!(Username::parse("a".repeat(21).as_str()).is_err());
        assert!(Username::parse("santa claus").is_err());
        assert!(Username::parse("rudolph-the-red").is_ok());
    }

    #[test]
    fn leaderboard_orders_by_score_then_streak() {
        let mut board = InMemoryLeaderboard::new();
        board.submit(&id(WALLET_A, "alpha"), &result(500, 3), None).unwrap();
        board.submit(&id(WALLET_B, "bravo"), &result(500, 9), None).unwrap();
        let c = "0x0000000000000000000000000000000000000003";
        board.submit(&id(c, "charlie"), &result(900, 1), None).unwrap();
        let names: Vec<_> = board.top(10).unwrap().into_iter().map(|e| e.username.as_str().to_string()).collect();
        assert_eq!(names, vec!["charlie", "bravo", "alpha"]);
        assert_eq!(board.top(2).unwrap().len(), 2);
    }

    #[test]
    fn leaderboard_keeps_best_per_player() {
        let mut board = InMemoryLeaderboard::new();
        let p = id(WALLET_A, "alpha");
        assert_eq!(board.submit(&p, &result(300, 2), None).unwrap(), SubmitOutcome::NewHighScore);
        assert_eq!(board.submit(&p, &result(200, 8), None).unwrap(), SubmitOutcome::Recorded);
        assert_eq!(board.submit(&p, &result(400, 1), None).unwrap(), SubmitOutcome::NewHighScore);
        let top = board.top(10).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].highest_score, 400);
        assert_eq!(board.history().len(), 3);
    }

    #[test]
    fn register_rejects_taken_name_case_insensitively() {
        let mut board = InMemoryLeaderboard::new();
        board.submit(&id(WALLET_A, "Comet"), &result(1, 1), None).unwrap();
        let err = register_player(&mut board, WALLET_B, "comet").unwrap_err();
        assert_eq!(err, ServiceError::UsernameTaken("comet".into()));
        assert!(register_player(&mut board, WALLET_B, "dasher").is_ok());
        // the owner may sign in again under the same name
        assert!(register_player(&mut board, WALLET_A, "COMET").is_ok());
    }

    #[test]
    fn registering_reserves_the_name_before_any_score() {
        let mut board = InMemoryLeaderboard::new();
        register_player(&mut board, WALLET_A, "comet").unwrap();
        assert_eq!(
            register_player(&mut board, WALLET_B, "Comet").unwrap_err(),
            ServiceError::UsernameTaken("Comet".into())
        );
        assert!(board.top(10).unwrap().is_empty());
    }

    #[test]
    fn returning_wallet_finds_its_identity() {
        let mut board = InMemoryLeaderboard::new();
        assert_eq!(returning_player(&board, WALLET_A).unwrap(), None);
        let p = register_player(&mut board, WALLET_A, "vixen").unwrap();
        assert_eq!(returning_player(&board, &WALLET_A.to_ascii_uppercase()).unwrap(), Some(p));
        assert!(returning_player(&board, "0x12").is_err());

        // a rename keeps one row per wallet and frees the old name
        register_player(&mut board, WALLET_A, "blitzen").unwrap();
        let found = returning_player(&board, WALLET_A).unwrap().unwrap();
        assert_eq!(found.username.as_str(), "blitzen");
        assert!(register_player(&mut board, WALLET_B, "vixen").is_ok());
    }

    #[test]
    fn submission_goes_chain_then_board_once() {
        let cfg = GameConfig::default();
        let mut chain = FakeChain { chain_id: cfg.chain_id, fail: false, calls: 0 };
        let mut board = InMemoryLeaderboard::new();
        let mut sub = ScoreSubmission::new();
        let p = id(WALLET_A, "alpha");

        let (tx, outcome) = sub.submit(&cfg, &p, Some(result(750, 6)), &mut chain, &mut board).unwrap();
        assert_eq!(outcome, SubmitOutcome::NewHighScore);
        assert_eq!(board.top(1).unwrap()[0].tx_hash.as_ref(), Some(&tx));
        assert_eq!(tx.short(), "0xdeadbeef");

        let again = sub.submit(&cfg, &p, Some(result(750, 6)), &mut chain, &mut board);
        assert_eq!(again.unwrap_err(), ServiceError::AlreadySubmitted);
        assert_eq!(chain.calls, 1);
    }

    #[test]
    fn failed_chain_call_leaves_nothing_recorded() {
        let cfg = GameConfig::default();
        let mut chain = FakeChain { chain_id: cfg.chain_id, fail: true, calls: 0 };
        let mut board = InMemoryLeaderboard::new();
        let mut sub = ScoreSubmission::new();
        let err = sub
            .submit(&cfg, &id(WALLET_A, "alpha"), Some(result(10, 1)), &mut chain, &mut board)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));
        assert!(!sub.is_submitted());
        assert!(board.top(10).unwrap().is_empty());
    }

    #[test]
    fn wrong_network_and_unfinished_sessions_are_refused() {
        let cfg = GameConfig::default();
        let mut chain = FakeChain { chain_id: 1, fail: false, calls: 0 };
        let mut board = InMemoryLeaderboard::new();
        let mut sub = ScoreSubmission::new();
        let p = id(WALLET_A, "alpha");
        assert_eq!(
            sub.submit(&cfg, &p, Some(result(10, 1)), &mut chain, &mut board).unwrap_err(),
            ServiceError::WrongNetwork { expected: 5031, actual: 1 }
        );
        assert_eq!(
            sub.submit(&cfg, &p, None, &mut chain, &mut board).unwrap_err(),
            ServiceError::SessionNotEnded
        );
        assert_eq!(chain.calls, 0);
    }
}
