use super::EncodeResult;
use crate::error::EncodeError;
use vmgate_types::{
    decimal::Decimal,
    host::{self, HostMessage, MsgVote, MsgVoteWeighted},
    vm::{GovMsg, VoteOption},
};

/// Encodes governance votes. Metadata is always empty.
pub fn encode(sender: &str, msg: &GovMsg) -> EncodeResult {
    let msg = match msg {
        GovMsg::Vote {
            proposal_id,
            option,
        } => HostMessage::Vote(MsgVote {
            proposal_id: *proposal_id,
            voter: sender.to_string(),
            option: convert_vote_option(option)?,
            metadata: String::new(),
        }),
        GovMsg::VoteWeighted {
            proposal_id,
            options,
        } => {
            let options = options
                .iter()
                .enumerate()
                .map(|(i, weighted)| -> Result<host::WeightedVoteOption, EncodeError> {
                    let weight: Decimal =
                        weighted
                            .weight
                            .parse()
                            .map_err(|source| EncodeError::InvalidWeight {
                                index: i + 1,
                                source,
                            })?;
                    Ok(host::WeightedVoteOption {
                        option: convert_vote_option(&weighted.option)?,
                        weight,
                    })
                })
                .collect::<Result<Vec<_>, EncodeError>>()?;
            HostMessage::VoteWeighted(MsgVoteWeighted {
                proposal_id: *proposal_id,
                voter: sender.to_string(),
                options,
                metadata: String::new(),
            })
        }
    };
    Ok(vec![msg])
}

fn convert_vote_option(option: &VoteOption) -> Result<host::VoteOption, EncodeError> {
    match option {
        VoteOption::Yes => Ok(host::VoteOption::Yes),
        VoteOption::No => Ok(host::VoteOption::No),
        VoteOption::NoWithVeto => Ok(host::VoteOption::NoWithVeto),
        VoteOption::Abstain => Ok(host::VoteOption::Abstain),
        VoteOption::Other(other) => Err(EncodeError::InvalidVoteOption {
            option: other.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmgate_types::{decimal::DecimalError, vm::WeightedVoteOption};

    fn weighted(option: &str, weight: &str) -> WeightedVoteOption {
        WeightedVoteOption {
            option: VoteOption::from(option),
            weight: weight.to_string(),
        }
    }

    #[test]
    fn vote_maps_options() {
        for (vm_option, host_option) in [
            ("yes", host::VoteOption::Yes),
            ("no", host::VoteOption::No),
            ("no_with_veto", host::VoteOption::NoWithVeto),
            ("abstain", host::VoteOption::Abstain),
        ] {
            let msgs = encode(
                "cosmos1voter",
                &GovMsg::Vote {
                    proposal_id: 1,
                    option: VoteOption::from(vm_option),
                },
            )
            .expect("valid vote");
            assert_eq!(
                msgs,
                vec![HostMessage::Vote(MsgVote {
                    proposal_id: 1,
                    voter: "cosmos1voter".to_string(),
                    option: host_option,
                    metadata: String::new(),
                })]
            );
        }
    }

    #[test]
    fn yes_vote_on_proposal() {
        let msgs = encode(
            "cosmos1voter",
            &GovMsg::Vote {
                proposal_id: 7,
                option: VoteOption::from("yes"),
            },
        )
        .expect("valid vote");
        assert_eq!(msgs.len(), 1);
        let HostMessage::Vote(vote) = &msgs[0] else {
            panic!("expected vote");
        };
        assert_eq!(vote.proposal_id, 7);
        assert_eq!(vote.option, host::VoteOption::Yes);
        assert!(vote.metadata.is_empty());
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = encode(
            "cosmos1voter",
            &GovMsg::Vote {
                proposal_id: 1,
                option: VoteOption::from("maybe"),
            },
        )
        .expect_err("unknown option");
        assert!(matches!(err, EncodeError::InvalidVoteOption { option } if option == "maybe"));
    }

    #[test]
    fn weighted_vote_keeps_order_and_exact_weights() {
        let msgs = encode(
            "cosmos1voter",
            &GovMsg::VoteWeighted {
                proposal_id: 2,
                options: vec![weighted("yes", "0.7"), weighted("no", "0.3")],
            },
        )
        .expect("valid weighted vote");
        let HostMessage::VoteWeighted(vote) = &msgs[0] else {
            panic!("expected weighted vote");
        };
        assert_eq!(vote.metadata, "");
        assert_eq!(vote.options[0].option, host::VoteOption::Yes);
        assert_eq!(vote.options[0].weight.to_string(), "0.700000000000000000");
        assert_eq!(vote.options[1].option, host::VoteOption::No);
        assert_eq!(vote.options[1].weight.to_string(), "0.300000000000000000");
        let total = vote
            .options
            .iter()
            .fold(Decimal::zero(), |sum, o| sum + &o.weight);
        assert_eq!(total, Decimal::one());
    }

    #[test]
    fn bad_weight_reports_one_based_index() {
        let err = encode(
            "cosmos1voter",
            &GovMsg::VoteWeighted {
                proposal_id: 2,
                options: vec![weighted("yes", "0.5"), weighted("no", "abc")],
            },
        )
        .expect_err("bad weight");
        assert!(matches!(
            err,
            EncodeError::InvalidWeight { index: 2, source: DecimalError::Invalid(_) }
        ));
    }

    #[test]
    fn weight_is_checked_before_option() {
        let err = encode(
            "cosmos1voter",
            &GovMsg::VoteWeighted {
                proposal_id: 2,
                options: vec![weighted("maybe", "")],
            },
        )
        .expect_err("bad weight and option");
        assert!(matches!(err, EncodeError::InvalidWeight { index: 1, .. }));
    }
}
