//! Template identifiers shared between the deriver and any validator-engine
//! implementation. The engine interprets these names; the deriver only embeds
//! them (plus parameters) into hashable script code.

/// One-shot token minting policy. Params: seed outpoint.
pub const TOKEN_MINT: &str = "programmable_token.mint";

/// Freeze-record validity marker policy. Params: seed outpoint, admin key hash.
pub const FREEZE_RECORD_MINT: &str = "freeze_record.mint";
/// Freeze-record spending validator. Params: seed outpoint, admin key hash.
pub const FREEZE_RECORD_SPEND: &str = "freeze_record.spend";

/// Blacklist-record validity marker policy. Params: seed outpoint, admin key hash.
pub const BLACKLIST_RECORD_MINT: &str = "blacklist_record.mint";
/// Blacklist-record spending validator. Params: seed outpoint, admin key hash.
pub const BLACKLIST_RECORD_SPEND: &str = "blacklist_record.spend";

/// Freeze check-marker policy. Params: record policy id, record marker name,
/// token policy id.
pub const FREEZE_CHECK: &str = "freeze_check.mint";
/// Blacklist check-marker policy. Params: record policy id, record marker
/// name, token policy id.
pub const BLACKLIST_CHECK: &str = "blacklist_check.mint";
/// Fee check-marker policy. Params: fee destination address, fee amount,
/// token policy id.
pub const FEE_CHECK: &str = "fee_check.mint";

/// Fee treasury spending validator. Params: admin key hash, token policy id.
pub const FEE_TREASURY_SPEND: &str = "fee_treasury.spend";

/// Proof-validity marker policy, unparameterized.
pub const PROOF_MINT: &str = "proof.mint";
/// Proof output spending validator, unparameterized.
pub const PROOF_SPEND: &str = "proof.spend";

/// Unrestricted minting policy for plain tokens. Params: bootstrap word.
pub const FREE_MINT: &str = "free_mint.mint";

/// Asset name of the proof-validity marker.
pub const PROOF_MARKER_NAME: &str = "PVT";
/// Asset name of the freeze-record validity marker.
pub const FREEZE_MARKER_NAME: &str = "FREEZE";
/// Asset name of the blacklist-record validity marker.
pub const BLACKLIST_MARKER_NAME: &str = "BLACKLIST";

/// All template identifiers known to the built-in blueprint.
pub const ALL: &[&str] = &[
    TOKEN_MINT,
    FREEZE_RECORD_MINT,
    FREEZE_RECORD_SPEND,
    BLACKLIST_RECORD_MINT,
    BLACKLIST_RECORD_SPEND,
    FREEZE_CHECK,
    BLACKLIST_CHECK,
    FEE_CHECK,
    FEE_TREASURY_SPEND,
    PROOF_MINT,
    PROOF_SPEND,
    FREE_MINT,
];
