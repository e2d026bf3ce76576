//! Golden encodings. A change here changes every digest validators compare.

use crate::coin::Coin;
use crate::host::{messages_digest, Height, HostMessage, MsgClearAdmin, MsgVote, VoteOption};
use commonware_codec::Encode;

#[test]
fn height_encoding_is_stable() {
    assert_eq!(
        Height::new(1, 2).encode().as_ref(),
        &[0u8, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2]
    );
}

#[test]
fn coin_encoding_is_stable() {
    assert_eq!(
        Coin::new("abc", 5u32).encode().as_ref(),
        &[0u8, 0, 0, 3, b'a', b'b', b'c', 0, 0, 0, 1, b'5']
    );
}

#[test]
fn clear_admin_encoding_is_stable() {
    let msg = HostMessage::ClearAdmin(MsgClearAdmin {
        sender: "ab".to_string(),
        contract: "cd".to_string(),
    });
    assert_eq!(
        msg.encode().as_ref(),
        &[12u8, 0, 0, 0, 2, b'a', b'b', 0, 0, 0, 2, b'c', b'd']
    );
}

#[test]
fn vote_encoding_is_stable() {
    let msg = HostMessage::Vote(MsgVote {
        proposal_id: 1,
        voter: "v".to_string(),
        option: VoteOption::Yes,
        metadata: String::new(),
    });
    assert_eq!(
        msg.encode().as_ref(),
        &[16u8, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, b'v', 1, 0, 0, 0, 0]
    );
}

#[test]
fn digest_is_stable() {
    let empty = commonware_utils::from_hex(
        "df3f619804a92fdb4057192dc43dd748ea778adc52bc498ce80524c014b81119",
    )
    .expect("valid hex");
    assert_eq!(messages_digest(&[]).as_ref(), empty.as_slice());

    let msg = HostMessage::ClearAdmin(MsgClearAdmin {
        sender: "ab".to_string(),
        contract: "cd".to_string(),
    });
    let expected = commonware_utils::from_hex(
        "778bcf82e81fdec1ff473cbd52821db4d40c3e1f1e364bf7f99ec668d58e9f6c",
    )
    .expect("valid hex");
    assert_eq!(messages_digest(&[msg]).as_ref(), expected.as_slice());
}
