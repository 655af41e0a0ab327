mod lower;
