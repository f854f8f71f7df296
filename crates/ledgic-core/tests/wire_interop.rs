// Cross-checks the hand-written wire codec against candid's serde encoder.

use candid::{CandidType, Deserialize, Nat, Principal, decode_one, encode_one};
use ledgic_core::{
    Account, Amount, Timestamp,
    memo::encode_uuids,
    spec::icrc1::TransferArg,
    spec::icrc2::{Allowance, ApproveArgs, TransferFromArgs},
    spec::index::{GetAccountTransactionsArgs, GetBlocksRequest},
    wire::{self, Descriptor, FromValue, ToValue, Typed, Value},
};

#[derive(CandidType, Debug, Deserialize, PartialEq)]
struct CandidTransferArg {
    from_subaccount: Option<Vec<u8>>,
    to: Account,
    amount: Nat,
    fee: Option<Nat>,
    memo: Option<Vec<u8>>,
    created_at_time: Option<u64>,
}

#[derive(CandidType, Debug, Deserialize, PartialEq)]
struct CandidApproveArgs {
    spender: Account,
    amount: Nat,
    fee: Option<Vec<u8>>,
    memo: Option<Vec<u8>>,
    from_subaccount: Option<Vec<u8>>,
    created_at_time: Option<u64>,
    expected_allowance: Option<Nat>,
    expires_at: Option<u64>,
}

#[derive(CandidType, Debug, Deserialize, PartialEq)]
struct CandidTransferFromArgs {
    from: Account,
    to: Account,
    amount: Nat,
    fee: Option<Vec<u8>>,
    memo: Option<Vec<u8>>,
    created_at_time: Option<u64>,
    expires_at: Option<u64>,
}

#[derive(CandidType, Debug, Deserialize, PartialEq)]
struct CandidAccountTransactionsArgs {
    account: Account,
    start: Option<Nat>,
    max_results: Nat,
}

#[derive(CandidType, Debug, Deserialize, PartialEq)]
struct CandidBlocksRequest {
    start: u64,
    length: u64,
}

#[derive(CandidType, Debug, Deserialize, PartialEq)]
struct CandidBlocks {
    chain_length: u64,
    blocks: Vec<Vec<u8>>,
}

#[derive(CandidType, Debug, Deserialize, PartialEq)]
struct CandidAllowance {
    allowance: Nat,
    expires_at: Option<u64>,
    // newer ledgers may add fields the client does not know about
    note: String,
}

#[derive(CandidType, Debug, Deserialize)]
enum CandidResult {
    Ok(Nat),
    Err(String),
}

fn owner() -> Principal {
    Principal::from_slice(&[7; 29])
}

#[test]
fn transfer_arg_is_readable_by_candid() {
    let memo = encode_uuids(
        "123e4567-e89b-12d3-a456-426614174000",
        "00000000-0000-0000-0000-000000000001",
    )
    .unwrap();
    let arg = TransferArg::new(Account::new(owner(), Some([3; 32])), Amount::from(1_250u64))
        .with_memo(memo)
        .with_created_at_time(Timestamp::from_nanos(1_700_000_000_000_000_000));

    let bytes = wire::encode(&TransferArg::descriptor(), &arg.to_value())
        .unwrap()
        .into_bytes();
    let decoded: CandidTransferArg = decode_one(&bytes).unwrap();

    assert_eq!(
        decoded,
        CandidTransferArg {
            from_subaccount: None,
            to: Account::new(owner(), Some([3; 32])),
            amount: Nat::from(1_250u64),
            fee: None,
            memo: Some(memo.as_bytes().to_vec()),
            created_at_time: Some(1_700_000_000_000_000_000),
        }
    );
}

fn our_bytes<T: ToValue>(arg: &T) -> Vec<u8> {
    wire::encode(&T::descriptor(), &arg.to_value())
        .unwrap()
        .into_bytes()
}

#[test]
fn approve_args_are_readable_by_candid() {
    let spender = Account::new(Principal::from_slice(&[9; 29]), None::<[u8; 32]>);
    let mut arg = ApproveArgs::new(spender, Amount::from(500u64))
        .with_expected_allowance(Amount::from(100u64))
        .with_expires_at(Timestamp::from_nanos(77))
        .with_created_at_time(Timestamp::from_nanos(66));
    arg.fee = Some(vec![0x10, 0x27]);
    arg.from_subaccount = Some([1; 32]);

    let decoded: CandidApproveArgs = decode_one(&our_bytes(&arg)).unwrap();

    assert_eq!(
        decoded,
        CandidApproveArgs {
            spender,
            amount: Nat::from(500u64),
            fee: Some(vec![0x10, 0x27]),
            memo: None,
            from_subaccount: Some(vec![1; 32]),
            created_at_time: Some(66),
            expected_allowance: Some(Nat::from(100u64)),
            expires_at: Some(77),
        }
    );
}

#[test]
fn transfer_from_args_are_readable_by_candid() {
    let from = Account::new(owner(), Some([2; 32]));
    let to = Account::new(Principal::from_slice(&[8; 29]), None::<[u8; 32]>);
    let arg = TransferFromArgs::new(from, to, Amount::from(40u64))
        .with_created_at_time(Timestamp::from_nanos(5));

    let decoded: CandidTransferFromArgs = decode_one(&our_bytes(&arg)).unwrap();

    assert_eq!(
        decoded,
        CandidTransferFromArgs {
            from,
            to,
            amount: Nat::from(40u64),
            fee: None,
            memo: None,
            created_at_time: Some(5),
            expires_at: None,
        }
    );
}

#[test]
fn account_transactions_args_are_readable_by_candid() {
    let account = Account::new(owner(), None::<[u8; 32]>);
    let arg = GetAccountTransactionsArgs {
        account,
        start: Some(Nat::from(150u64)),
        max_results: Nat::from(100u64),
    };

    let decoded: CandidAccountTransactionsArgs = decode_one(&our_bytes(&arg)).unwrap();

    assert_eq!(
        decoded,
        CandidAccountTransactionsArgs {
            account,
            start: Some(Nat::from(150u64)),
            max_results: Nat::from(100u64),
        }
    );
}

#[test]
fn blocks_request_is_nat64_on_the_wire() {
    let arg = GetBlocksRequest {
        start: 2,
        length: 9,
    };

    let decoded: CandidBlocksRequest = decode_one(&our_bytes(&arg)).unwrap();
    assert_eq!(decoded, CandidBlocksRequest { start: 2, length: 9 });

    let theirs = encode_one(CandidBlocksRequest { start: 2, length: 9 }).unwrap();
    assert_eq!(our_bytes(&arg), theirs);
}

#[test]
fn candid_encoded_account_decodes() {
    let account = Account::new(owner(), None::<[u8; 32]>);
    let bytes = encode_one(account).unwrap();

    let value = wire::decode(&Account::descriptor(), &bytes).unwrap();
    assert_eq!(Account::from_value(value).unwrap(), account);
}

#[test]
fn extra_reply_fields_are_skipped() {
    let reply = CandidAllowance {
        allowance: Nat::from(42u64),
        expires_at: Some(9),
        note: "ignored".to_string(),
    };
    let bytes = encode_one(&reply).unwrap();

    let value = wire::decode(&Allowance::descriptor(), &bytes).unwrap();
    let allowance = Allowance::from_value(value).unwrap();

    assert_eq!(allowance.allowance, Amount::from(42u64));
    assert_eq!(allowance.expires_at, Some(Timestamp::from_nanos(9)));
}

#[test]
fn vec_nat8_and_blob_are_interchangeable() {
    let reply = CandidBlocks {
        chain_length: 2,
        blocks: vec![vec![1, 2, 3], Vec::new()],
    };
    let bytes = encode_one(&reply).unwrap();

    let d = Descriptor::record([
        ("chain_length", Descriptor::Nat64),
        ("blocks", Descriptor::vec(Descriptor::Blob)),
    ]);
    let mut fields = wire::decode(&d, &bytes).unwrap().into_fields().unwrap();

    assert_eq!(
        fields.take("blocks").unwrap(),
        Value::Vec(vec![Value::Blob(vec![1, 2, 3]), Value::Blob(Vec::new())])
    );
}

#[test]
fn variant_results_agree_on_tags() {
    let d = Descriptor::variant([("Ok", Descriptor::Nat), ("Err", Descriptor::Text)]);

    let ours = wire::encode(&d, &Value::variant("Err", Value::Text("nope".into())))
        .unwrap()
        .into_bytes();
    match decode_one::<CandidResult>(&ours).unwrap() {
        CandidResult::Err(message) => assert_eq!(message, "nope"),
        CandidResult::Ok(n) => panic!("decoded Ok({n})"),
    }

    let theirs = encode_one(CandidResult::Ok(Nat::from(17u64))).unwrap();
    let (tag, payload) = wire::decode(&d, &theirs).unwrap().into_variant().unwrap();
    assert_eq!(tag.to_string(), "Ok");
    assert_eq!(payload.into_nat().unwrap(), Nat::from(17u64));
}

#[test]
fn foreign_bytes_are_rejected() {
    assert!(wire::decode(&Descriptor::Nat, b"not candid at all").is_err());

    let text = encode_one("hello").unwrap();
    assert!(wire::decode(&Descriptor::Nat, &text).is_err());

    let mut truncated = encode_one(Nat::from(u64::MAX)).unwrap();
    truncated.pop();
    assert!(wire::decode(&Descriptor::Nat, &truncated).is_err());
}
